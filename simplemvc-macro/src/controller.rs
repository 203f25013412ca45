use crate::injectable::construct_from_container;
use heck::ToUpperCamelCase;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Attribute, FnArg, ImplItem, ImplItemFn,
    ItemImpl, ItemStruct, LitStr, Token, Visibility,
};

struct ControllerArgs {
    name: Option<String>,
    authorize: bool,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ControllerArgs {
            name: None,
            authorize: false,
        };
        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            if key == "name" {
                input.parse::<Token![=]>()?;
                let lit: LitStr = input.parse()?;
                args.name = Some(lit.value());
            } else if key == "authorize" {
                args.authorize = true;
            } else {
                return Err(syn::Error::new_spanned(
                    key,
                    "expected `name = \"...\"` or `authorize`",
                ));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(args)
    }
}

pub fn controller_attribute(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let input = parse_macro_input!(item as ItemStruct);
    generate_controller_impl(args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_controller_impl(args: ControllerArgs, mut input: ItemStruct) -> syn::Result<TokenStream2> {
    let authorize = args.authorize || strip_authorize(&mut input.attrs);
    let struct_name = &input.ident;
    let name = args.name.unwrap_or_else(|| controller_name(&struct_name.to_string()));
    let constructor = construct_from_container(&input.fields)?;

    Ok(quote! {
        #input

        impl ::simplemvc::Injectable for #struct_name {
            fn inject(container: &::simplemvc::Container) -> ::simplemvc::Result<Self> {
                Ok(#constructor)
            }
        }

        impl #struct_name {
            #[doc(hidden)]
            pub const __CONTROLLER_NAME: &'static str = #name;
            #[doc(hidden)]
            pub const __CONTROLLER_MODULE: &'static str = ::core::module_path!();
            #[doc(hidden)]
            pub const __CONTROLLER_REQUIRES_AUTH: bool = #authorize;
        }
    })
}

/// `HomeController` → `Home`; other names are kept as written.
fn controller_name(ident: &str) -> String {
    match ident.strip_suffix("Controller") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => ident.to_string(),
    }
}

pub fn actions_attribute(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    generate_actions_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct ActionInfo {
    name: String,
    fn_name: syn::Ident,
    takes_params: bool,
    authorize: bool,
}

fn generate_actions_impl(mut input: ItemImpl) -> syn::Result<TokenStream2> {
    if input.trait_.is_some() {
        return Err(syn::Error::new_spanned(
            &input.self_ty,
            "#[actions] goes on an inherent impl block",
        ));
    }

    let mut actions = Vec::new();
    for item in input.items.iter_mut() {
        if let ImplItem::Fn(method) = item {
            let authorize = strip_authorize(&mut method.attrs);
            match extract_action_info(method, authorize)? {
                Some(info) => actions.push(info),
                None if authorize => {
                    return Err(syn::Error::new_spanned(
                        &method.sig.ident,
                        "#[authorize] only applies to `pub fn(&self ..)` actions",
                    ))
                }
                None => {}
            }
        }
    }

    let self_ty = &input.self_ty;
    let action_entries = actions.iter().map(|action| {
        let name = &action.name;
        let fn_name = &action.fn_name;
        let entry = if action.takes_params {
            quote! {
                ::simplemvc::Action::with_params(
                    #name,
                    |controller: &#self_ty, params: ::simplemvc::Params| controller.#fn_name(params),
                )
            }
        } else {
            quote! {
                ::simplemvc::Action::new(#name, |controller: &#self_ty| controller.#fn_name())
            }
        };
        if action.authorize {
            quote!(#entry.authorize())
        } else {
            entry
        }
    });

    Ok(quote! {
        #input

        impl ::simplemvc::Controller for #self_ty {
            const NAME: &'static str = <#self_ty>::__CONTROLLER_NAME;
            const MODULE_PATH: &'static str = <#self_ty>::__CONTROLLER_MODULE;
            const REQUIRES_AUTH: bool = <#self_ty>::__CONTROLLER_REQUIRES_AUTH;

            fn actions() -> ::std::vec::Vec<::simplemvc::Action<Self>> {
                ::std::vec![#(#action_entries),*]
            }
        }
    })
}

/// Public `&self` methods are actions; `get_index` is served as `GetIndex`.
fn extract_action_info(method: &ImplItemFn, authorize: bool) -> syn::Result<Option<ActionInfo>> {
    if !matches!(method.vis, Visibility::Public(_)) {
        return Ok(None);
    }
    let mut inputs = method.sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none() => {}
        _ => return Ok(None),
    }
    if method.sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            method.sig.fn_token,
            "actions run on the worker pool and must not be async",
        ));
    }

    let rest: Vec<_> = inputs.collect();
    if rest.len() > 1 {
        return Err(syn::Error::new_spanned(
            &method.sig.inputs,
            "an action takes `&self` and at most one `Params` argument",
        ));
    }

    Ok(Some(ActionInfo {
        name: method.sig.ident.to_string().to_upper_camel_case(),
        fn_name: method.sig.ident.clone(),
        takes_params: !rest.is_empty(),
        authorize,
    }))
}

/// Remove `#[authorize]` markers, reporting whether one was present.
fn strip_authorize(attrs: &mut Vec<Attribute>) -> bool {
    let before = attrs.len();
    attrs.retain(|attr| !is_authorize_attr(attr));
    attrs.len() != before
}

fn is_authorize_attr(attr: &Attribute) -> bool {
    let path = attr.path();
    path.is_ident("authorize")
        || path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "authorize" && path.segments.len() == 2)
}
