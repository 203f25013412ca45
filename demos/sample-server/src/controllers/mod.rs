mod account;
mod home;

pub use account::AccountController;
pub use home::HomeController;
