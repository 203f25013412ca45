use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = match &input.data {
        Data::Struct(data) => generate_injectable_impl(&input, &data.fields),
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Injectable)] can only be applied to structs",
        )),
    };

    expanded
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_injectable_impl(input: &DeriveInput, fields: &Fields) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let constructor = construct_from_container(fields)?;

    Ok(quote! {
        impl #impl_generics ::simplemvc::Injectable for #struct_name #ty_generics #where_clause {
            fn inject(
                container: &::simplemvc::Container
            ) -> ::simplemvc::Result<Self> {
                Ok(#constructor)
            }
        }
    })
}

/// `Self { field: container.resolve::<T>()?, .. }`, or `Self` for unit structs.
pub(crate) fn construct_from_container(fields: &Fields) -> syn::Result<TokenStream2> {
    match fields {
        Fields::Unit => Ok(quote!(Self)),
        Fields::Named(named) => {
            let field_injections = named.named.iter().map(|field| {
                let field_name = &field.ident;
                let field_type = extract_injectable_type(&field.ty);

                let resolve_method = match &field_type {
                    Type::TraitObject(_) => quote!(resolve_trait),
                    _ => quote!(resolve),
                };

                quote! {
                    #field_name: container.#resolve_method::<#field_type>()?
                }
            });
            Ok(quote!(Self { #(#field_injections),* }))
        }
        Fields::Unnamed(unnamed) => Err(syn::Error::new_spanned(
            unnamed,
            "injectable structs need named fields",
        )),
    }
}

/// Extract the inner type from Arc<T> or Arc<dyn Trait>
fn extract_injectable_type(ty: &Type) -> Type {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Arc" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner_type)) = args.args.first() {
                        return inner_type.clone();
                    }
                }
            }
        }
    }

    ty.clone()
}
