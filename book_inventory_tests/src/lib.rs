//! Tests run against a running book_inventory service,
//! its url is taken from BOOK_INVENTORY_URL (default http://127.0.0.1:8888)

#[cfg(all(test, feature = "system_tests"))]
mod system_tests;

#[cfg(all(test, feature = "load_tests"))]
mod load_test;

#[cfg(all(test, any(feature = "system_tests", feature = "load_tests")))]
pub(crate) fn service_url() -> String {
    std::env::var("BOOK_INVENTORY_URL").unwrap_or("http://127.0.0.1:8888".to_string())
}
