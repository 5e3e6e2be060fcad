/// Build version printed by `-version`.
///
/// Release builds inject it through `LOADER_BUILD_VERSION`; otherwise the crate version is used.
pub const VERSION: &str = match option_env!("LOADER_BUILD_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};
