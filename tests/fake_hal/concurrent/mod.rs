use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Mutex;

lazy_static! {
    static ref DATA_INDICES_MAP: Mutex<HashMap<&'static str, usize>> = Mutex::new(HashMap::new());
    static ref CLOCKS_MAP: Mutex<HashMap<&'static str, u64>> = Mutex::new(HashMap::new());
}

pub fn set_named_value(name: &'static str, value: usize) {
    let mut map = DATA_INDICES_MAP.lock().unwrap();
    map.insert(name, value);
}

pub fn get_and_increment_named_value(name: &str) -> usize {
    let mut map = DATA_INDICES_MAP.lock().unwrap();
    let index = map.get_mut(name).unwrap();
    *index = *index + 1;
    *index - 1
}

/// Simulated microseconds elapsed on the named bus.
pub fn get_named_clock(name: &str) -> u64 {
    let map = CLOCKS_MAP.lock().unwrap();
    *map.get(name).unwrap_or(&0)
}

pub fn reset_named_clock(name: &'static str) {
    let mut map = CLOCKS_MAP.lock().unwrap();
    map.insert(name, 0);
}

pub fn advance_named_clock(name: &'static str, us: u64) {
    let mut map = CLOCKS_MAP.lock().unwrap();
    *map.entry(name).or_insert(0) += us;
}
