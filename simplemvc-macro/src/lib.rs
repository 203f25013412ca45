use proc_macro::TokenStream;

mod controller;
mod injectable;

/// Derive macro for making a struct injectable from the DI container
///
/// Every `Arc<T>` field is resolved with `Container::resolve`, every
/// `Arc<dyn Trait>` field with `Container::resolve_trait`.
///
/// # Example
/// ```ignore
/// use simplemvc::prelude::*;
///
/// #[derive(Injectable)]
/// pub struct OrderService {
///     repository: Arc<dyn OrderRepository>,
/// }
/// ```
#[proc_macro_derive(Injectable)]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Attribute macro declaring a controller
///
/// The controller name is the struct name without its `Controller` suffix,
/// unless given with `name = "..."`. `authorize` (or a `#[authorize]` attribute
/// below this one) protects every action. Fields are injected like
/// `#[derive(Injectable)]`.
///
/// # Example
/// ```ignore
/// #[controller]
/// pub struct AccountController {
///     users: Arc<UserService>,
/// }
///
/// #[controller(name = "Admin", authorize)]
/// pub struct AdminPanel;
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_attribute(attr, item)
}

/// Attribute macro collecting a controller's actions from an impl block
///
/// Each `pub fn` taking `&self` becomes an action named after the method in
/// UpperCamelCase: `get_index` answers `GET /<Controller>`, `post_save` answers
/// `POST /<Controller>/save`. An action takes either nothing or one `Params`.
///
/// # Example
/// ```ignore
/// #[actions]
/// impl AccountController {
///     pub fn get_index(&self) -> View<Summary> { ... }
///
///     #[authorize]
///     pub fn post_save(&self, params: Params) -> Redirect { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn actions(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::actions_attribute(attr, item)
}

/// Marks an action (inside `#[actions]`) or a controller (below `#[controller]`)
/// as requiring an authenticated identity.
///
/// Expanding on its own means it was placed where no controller macro saw it.
#[proc_macro_attribute]
pub fn authorize(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut out: TokenStream = syn::Error::new(
        proc_macro2::Span::call_site(),
        "#[authorize] must sit inside an #[actions] impl or below #[controller]",
    )
    .into_compile_error()
    .into();
    out.extend(item);
    out
}
