use crate::services::DisplayNames;
use simplemvc::prelude::*;

/// Every action needs a `user=<name>` cookie.
#[controller(authorize)]
pub struct AccountController {
    names: Arc<DisplayNames>,
}

#[actions]
impl AccountController {
    pub fn get_index(&self, params: Params) -> serde_json::Value {
        let user = params
            .context()
            .identity()
            .map(|identity| self.names.display_name(&identity.name))
            .unwrap_or_default();
        serde_json::json!({ "user": user })
    }

    /// Form post from the index page; `display_name` arrives as `DisplayName`.
    pub fn post_rename(&self, params: Params) -> Result<Redirect> {
        let display_name = params.require("DisplayName")?;
        if let Some(identity) = params.context().identity() {
            self.names.rename(&identity.name, display_name);
        }
        Ok(Redirect::to_action::<AccountController>("GetIndex", &[] as &[&str]))
    }
}
