use crate::services::VisitCounter;
use serde::Serialize;
use simplemvc::prelude::*;

#[derive(Serialize)]
pub struct IndexModel {
    title: &'static str,
    visits: u64,
}

#[controller]
pub struct HomeController {
    visits: Arc<VisitCounter>,
}

#[actions]
impl HomeController {
    /// `GET /` and `GET /Home`
    pub fn get_index(&self) -> View<IndexModel> {
        View(IndexModel {
            title: "simplemvc sample",
            visits: self.visits.hit(),
        })
    }

    pub fn get_about(&self) -> serde_json::Value {
        serde_json::json!({ "server": concat!("sample-server ", env!("CARGO_PKG_VERSION")) })
    }

    /// `GET /Home/greet/<name>`
    pub fn get_greet(&self, params: Params) -> serde_json::Value {
        serde_json::json!({ "name": params.positional(1).unwrap_or("stranger") })
    }

    /// `GET /Home/robots`
    pub fn get_robots(&self) -> Vec<u8> {
        b"User-agent: *\nDisallow: /Account\n".to_vec()
    }
}
