use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(PartialEq, Clone, Copy)]
enum Action {
    Off,
    On,
    Times(u32),
}

/// Named switches used by tests to make a code path fail on demand.
#[derive(Clone, Default)]
pub struct Failpoints {
    actions: Arc<Mutex<HashMap<String, Action>>>,
}

impl Failpoints {
    pub fn create() -> Failpoints {
        Failpoints::default()
    }

    fn action<S: AsRef<str>>(&self, name: S, action: Action) {
        let mut actions = self.actions.lock().unwrap_or_else(|e| e.into_inner());
        actions.insert(name.as_ref().to_owned(), action);
    }

    pub fn on<S: AsRef<str>>(&self, name: S) {
        self.action(name, Action::On);
    }

    /// Fires for the next `times` checks, then turns itself off.
    pub fn on_times<S: AsRef<str>>(&self, name: S, times: u32) {
        self.action(name, Action::Times(times));
    }

    pub fn off<S: AsRef<str>>(&self, name: S) {
        self.action(name, Action::Off);
    }

    pub fn is_on<S: AsRef<str>>(&self, name: S) -> bool {
        let mut actions = self.actions.lock().unwrap_or_else(|e| e.into_inner());
        match actions.get(name.as_ref()).copied().unwrap_or(Action::Off) {
            Action::On => true,
            Action::Times(left) => {
                let next = if left > 1 { Action::Times(left - 1) } else { Action::Off };
                actions.insert(name.as_ref().to_owned(), next);
                left > 0
            }
            Action::Off => false,
        }
    }
}

#[cfg(test)]
#[macro_export]
macro_rules! failpoint {
    ($fp:expr, $name:expr, $ret:expr) => {
        if $fp.is_on($name) {
            return $ret;
        }
    };
}

#[cfg(not(test))]
#[macro_export]
macro_rules! failpoint {
    ($fp:expr, $name:expr, $ret:expr) => {
        {};
    };
}
