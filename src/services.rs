use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::error::{RouenError, RouenResult};

/// Process-wide service directory keyed by `(type, name)`.
///
/// Cards and the main loop use it for dependency injection (renderer handle,
/// deferred queue, capture service) and as the command bus: named callables
/// are stored as [`Endpoint`] values and invoked through [`Services::call`].
///
/// One lock serializes the map; the services themselves are shared and
/// unlocked. The same name under two different types is two distinct entries.
#[derive(Default)]
pub struct Services {
    entries: Mutex<HashMap<ServiceKey, Arc<dyn Any + Send + Sync>>>,
}

#[derive(PartialEq, Eq, Hash)]
struct ServiceKey {
    type_id: TypeId,
    name: String,
}

impl ServiceKey {
    fn of<T: Any>(name: &str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: name.to_string(),
        }
    }
}

impl Services {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert or replace. Last writer wins.
    pub fn add<T: Any + Send + Sync>(&self, name: &str, service: Arc<T>) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(ServiceKey::of::<T>(name), service);
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> RouenResult<Arc<T>> {
        let entries = self.entries.lock().unwrap();
        let entry = entries
            .get(&ServiceKey::of::<T>(name))
            .cloned()
            .ok_or_else(|| {
                RouenError::not_found(format!(
                    "service '{name}' of type {}",
                    std::any::type_name::<T>()
                ))
            })?;
        entry.downcast::<T>().map_err(|_| {
            RouenError::not_found(format!(
                "service '{name}' stored under a different type than {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// No-op when absent.
    pub fn remove<T: Any + Send + Sync>(&self, name: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(&ServiceKey::of::<T>(name));
    }

    /// Snapshot of the names registered under `T`, sorted.
    pub fn keys<T: Any + Send + Sync>(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap();
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|k| k.type_id == TypeId::of::<T>())
            .map(|k| k.name.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Snapshot of every `(name, service)` pair registered under `T`, sorted
    /// by name.
    pub fn all<T: Any + Send + Sync>(&self) -> Vec<(String, Arc<T>)> {
        let mut out = Vec::new();
        let entries = self.entries.lock().unwrap();
        for (key, entry) in entries.iter() {
            if key.type_id != TypeId::of::<T>() {
                continue;
            }
            if let Ok(service) = entry.clone().downcast::<T>() {
                out.push((key.name.clone(), service));
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Install a named callable taking `A` and returning `R`.
    pub fn add_endpoint<A, R>(&self, name: &str, f: impl Fn(A) -> R + Send + Sync + 'static)
    where
        A: 'static,
        R: 'static,
    {
        self.add(name, Arc::new(Endpoint::new(f)));
    }

    /// Resolve a named callable and invoke it. A lookup miss propagates as
    /// [`RouenError::NotFound`]; whatever the callable returns is passed
    /// through unchanged.
    pub fn call<A, R>(&self, name: &str, arg: A) -> RouenResult<R>
    where
        A: 'static,
        R: 'static,
    {
        Ok(self.get::<Endpoint<A, R>>(name)?.invoke(arg))
    }

    /// [`Services::call`] for nullary endpoints.
    pub fn call0<R: 'static>(&self, name: &str) -> RouenResult<R> {
        self.call::<(), R>(name, ())
    }
}

/// A named side-effect entry on the command bus: a boxed closure stored in the
/// registry under its argument/return types.
pub struct Endpoint<A, R = ()> {
    f: Box<dyn Fn(A) -> R + Send + Sync>,
}

impl<A, R> Endpoint<A, R> {
    pub fn new(f: impl Fn(A) -> R + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    pub fn invoke(&self, arg: A) -> R {
        (self.f)(arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn get_before_add_is_not_found() {
        let services = Services::new();
        let err = services.get::<String>("missing").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn last_writer_wins() {
        let services = Services::new();
        services.add("greeting", Arc::new("hello".to_string()));
        services.add("greeting", Arc::new("bonjour".to_string()));
        assert_eq!(*services.get::<String>("greeting").unwrap(), "bonjour");
    }

    #[test]
    fn same_name_different_types_are_distinct() {
        let services = Services::new();
        services.add("answer", Arc::new(42u32));
        services.add("answer", Arc::new("forty-two".to_string()));
        assert_eq!(*services.get::<u32>("answer").unwrap(), 42);
        assert_eq!(*services.get::<String>("answer").unwrap(), "forty-two");
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let services = Services::new();
        services.remove::<u32>("nothing");
        services.add("n", Arc::new(1u32));
        services.remove::<u32>("n");
        assert!(services.get::<u32>("n").is_err());
    }

    #[test]
    fn keys_are_sorted_and_type_scoped() {
        let services = Services::new();
        services.add("b", Arc::new(2u32));
        services.add("a", Arc::new(1u32));
        services.add("c", Arc::new("str".to_string()));
        assert_eq!(services.keys::<u32>(), vec!["a", "b"]);
        assert_eq!(services.keys::<String>(), vec!["c"]);
    }

    #[test]
    fn all_returns_name_service_pairs() {
        let services = Services::new();
        services.add("x", Arc::new(10u32));
        services.add("y", Arc::new(20u32));
        let all = services.all::<u32>();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "x");
        assert_eq!(*all[1].1, 20);
    }

    #[test]
    fn endpoints_are_called_through_the_registry() {
        let services = Services::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        services.add_endpoint("bump", move |by: usize| {
            counter.fetch_add(by, Ordering::SeqCst);
            "ok".to_string()
        });

        let out: String = services.call("bump", 3usize).unwrap();
        assert_eq!(out, "ok");
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        assert!(services.call::<usize, String>("nope", 1).is_err());
    }
}
