//! Configuration access port trait.
//!
//! Lookups are by `[section] key`. Typed getters take the default to use when the
//! key is absent or unusable; range checks belong to the caller.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
