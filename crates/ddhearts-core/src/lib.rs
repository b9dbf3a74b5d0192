pub mod game;
pub mod model;
pub mod playout;
pub mod search;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "ddhearts"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "ddhearts");
        assert!(!AppInfo::version().is_empty());
    }
}
