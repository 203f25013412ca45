use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct VisitCounter {
    count: AtomicU64,
}

impl VisitCounter {
    pub fn hit(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Display names chosen by signed-in users, keyed by login.
#[derive(Default)]
pub struct DisplayNames {
    names: RwLock<HashMap<String, String>>,
}

impl DisplayNames {
    pub fn display_name(&self, login: &str) -> String {
        let names = self.names.read().unwrap_or_else(|poisoned| {
            tracing::warn!("display names lock poisoned, reading anyway");
            poisoned.into_inner()
        });
        names
            .get(login)
            .cloned()
            .unwrap_or_else(|| login.to_string())
    }

    pub fn rename(&self, login: &str, display_name: &str) {
        let mut names = self.names.write().unwrap_or_else(|poisoned| {
            tracing::warn!("display names lock poisoned, recovering");
            self.names.clear_poison();
            poisoned.into_inner()
        });
        names.insert(login.to_string(), display_name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_rename_and_lookup() {
        let names = DisplayNames::default();
        assert_eq!(names.display_name("ada"), "ada");
        names.rename("ada", "Ada Lovelace");
        assert_eq!(names.display_name("ada"), "Ada Lovelace");
    }

    #[test]
    fn test_rename_survives_poisoned_lock() {
        let names = Arc::new(DisplayNames::default());
        let holder = Arc::clone(&names);
        let _ = std::thread::spawn(move || {
            let _guard = holder.names.write().unwrap();
            panic!("writer crashed");
        })
        .join();
        assert!(names.names.is_poisoned());

        names.rename("ada", "Ada Lovelace");
        assert_eq!(names.display_name("ada"), "Ada Lovelace");
        assert!(!names.names.is_poisoned());
    }

    #[test]
    fn test_visit_counter_counts_up() {
        let visits = VisitCounter::default();
        assert_eq!(visits.hit(), 1);
        assert_eq!(visits.hit(), 2);
    }
}
