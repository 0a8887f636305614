pub mod headless;
pub mod logger;

pub use headless::HeadlessContext;
