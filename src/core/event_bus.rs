use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::terrain::chunk_scheduler::GenerationReport;
use crate::terrain::terrain_config::SchedulingPolicy;

// Boxed event handler type
type BoxedHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// EventBus
///
/// Type-keyed broadcast of run lifecycle events to any number of listeners,
/// so diagnostics never need a handle on the scheduler itself.
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<HashMap<TypeId, Vec<BoxedHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Vec<BoxedHandler>>> {
        // a panicking handler must not take the bus down with it
        match self.handlers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // Subscribe to a specific event type
    pub fn subscribe<T, F>(&self, handler: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        // Create a type-erased handler
        let boxed_handler: BoxedHandler = Arc::new(move |event: &dyn Any| {
            if let Some(specific_event) = event.downcast_ref::<T>() {
                handler(specific_event);
            }
        });

        self.lock().entry(TypeId::of::<T>()).or_default().push(boxed_handler);
    }

    // Publish an event to all relevant handlers
    pub fn publish<T>(&self, event: T)
    where
        T: Send + Sync + 'static,
    {
        // Clone the handler list so handlers may subscribe while being called
        let handlers: Vec<BoxedHandler> = match self.lock().get(&TypeId::of::<T>()) {
            Some(list) => list.clone(),
            None => return,
        };

        for handler in handlers {
            handler(&event);
        }
    }

    pub fn handler_count<T: 'static>(&self) -> usize {
        self.lock().get(&TypeId::of::<T>()).map_or(0, Vec::len)
    }
}

// Event Types
#[derive(Debug, Clone)]
pub struct GenerationStartedEvent {
    pub run_id: Uuid,
    pub seed: u32,
    pub map_size: u32,
    pub chunk_size: u32,
    pub policy: SchedulingPolicy,
}

#[derive(Debug, Clone)]
pub struct ChunkFinalizedEvent {
    pub run_id: Uuid,
    pub chunk_id: usize,
    pub world_position: [i32; 2],
    pub build_ms: u128,
}

#[derive(Debug, Clone)]
pub struct GenerationCompletedEvent {
    pub report: GenerationReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn delivers_only_matching_events() {
        let bus = EventBus::new();
        let finalized = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&finalized);
        bus.subscribe(move |event: &ChunkFinalizedEvent| {
            counter.fetch_add(event.chunk_id, Ordering::SeqCst);
        });
        assert_eq!(bus.handler_count::<ChunkFinalizedEvent>(), 1);
        assert_eq!(bus.handler_count::<GenerationStartedEvent>(), 0);

        bus.publish(ChunkFinalizedEvent {
            run_id: Uuid::nil(),
            chunk_id: 3,
            world_position: [0, 0],
            build_ms: 1,
        });
        bus.publish(GenerationStartedEvent {
            run_id: Uuid::nil(),
            seed: 1,
            map_size: 400,
            chunk_size: 200,
            policy: SchedulingPolicy::Eager,
        });

        assert_eq!(finalized.load(Ordering::SeqCst), 3);
    }

    // Multiple subscribers test
    #[test]
    fn test_multiple_subscribers() {
        let event_bus = EventBus::new();
        let received_count = Arc::new(Mutex::new(0));

        for _ in 0..3 {
            let count_clone = Arc::clone(&received_count);
            event_bus.subscribe(move |_: &GenerationStartedEvent| {
                *count_clone.lock().unwrap() += 1;
            });
        }

        event_bus.publish(GenerationStartedEvent {
            run_id: Uuid::new_v4(),
            seed: 7,
            map_size: 400,
            chunk_size: 200,
            policy: SchedulingPolicy::OnDemand,
        });

        assert_eq!(*received_count.lock().unwrap(), 3);
    }

    // A handler may subscribe more handlers while being called
    #[test]
    fn test_subscribe_from_handler() {
        let event_bus = Arc::new(EventBus::new());
        let bus = Arc::clone(&event_bus);
        event_bus.subscribe(move |_: &ChunkFinalizedEvent| {
            bus.subscribe(|_: &ChunkFinalizedEvent| {});
        });

        let event = ChunkFinalizedEvent { run_id: Uuid::nil(), chunk_id: 0, world_position: [0, 0], build_ms: 0 };
        event_bus.publish(event.clone());
        event_bus.publish(event);
        assert_eq!(event_bus.handler_count::<ChunkFinalizedEvent>(), 3);
    }
}
