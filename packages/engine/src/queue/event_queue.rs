// packages/engine/src/queue/event_queue.rs
//! Lock-free MPSC event queue with an optional capacity bound
//!
//! Many producers call [`EventQueue::try_enqueue`]; a single batch worker
//! calls [`EventQueue::drain`]. Admission never blocks: a full or closed
//! queue rejects the event and hands it back.

use crate::event::Event;
use crossbeam::queue::SegQueue;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Why an event was not admitted
#[derive(Debug)]
pub enum TryEnqueueError {
    /// Capacity reached
    Full(Event),
    
    /// `complete_adding` has been called
    Closed(Event),
}

impl TryEnqueueError {
    pub fn into_inner(self) -> Event {
        match self {
            TryEnqueueError::Full(event) | TryEnqueueError::Closed(event) => event,
        }
    }
}

impl fmt::Display for TryEnqueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryEnqueueError::Full(_) => f.write_str("event queue is full"),
            TryEnqueueError::Closed(_) => f.write_str("event queue is closed for adding"),
        }
    }
}

impl std::error::Error for TryEnqueueError {}

/// Event queue shared by producers and the batch worker
pub struct EventQueue {
    /// Underlying unbounded queue
    queue: SegQueue<Event>,
    
    /// Upper bound on buffered events, `None` for unbounded
    capacity: Option<usize>,
    
    /// Admitted but not yet drained; counts reservations, so may briefly
    /// run ahead of what `queue` holds
    len: AtomicUsize,
    
    /// Set once by `complete_adding`
    closed: AtomicBool,
    
    /// Push counter
    push_count: AtomicU64,
    
    /// Pop counter
    pop_count: AtomicU64,
    
    /// Reject counter (full or closed)
    reject_count: AtomicU64,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` events
    pub fn bounded(capacity: usize) -> Self {
        Self::new(Some(capacity))
    }
    
    pub fn unbounded() -> Self {
        Self::new(None)
    }
    
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            queue: SegQueue::new(),
            capacity,
            len: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            push_count: AtomicU64::new(0),
            pop_count: AtomicU64::new(0),
            reject_count: AtomicU64::new(0),
        }
    }
    
    /// Add an event without waiting
    pub fn try_enqueue(&self, event: Event) -> Result<(), TryEnqueueError> {
        if self.closed.load(Ordering::Acquire) {
            self.reject_count.fetch_add(1, Ordering::Relaxed);
            return Err(TryEnqueueError::Closed(event));
        }
        
        match self.capacity {
            Some(capacity) => {
                let reserved = self
                    .len
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |len| {
                        (len < capacity).then_some(len + 1)
                    });
                if reserved.is_err() {
                    self.reject_count.fetch_add(1, Ordering::Relaxed);
                    return Err(TryEnqueueError::Full(event));
                }
            }
            None => {
                self.len.fetch_add(1, Ordering::AcqRel);
            }
        }
        
        self.queue.push(event);
        self.push_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
    
    /// Remove up to `max_items` events that are available right now
    ///
    /// Never waits; an empty queue yields an empty vector.
    pub fn drain(&self, max_items: usize) -> Vec<Event> {
        let mut events = Vec::with_capacity(max_items.min(self.len()));
        
        while events.len() < max_items {
            match self.queue.pop() {
                Some(event) => {
                    self.len.fetch_sub(1, Ordering::AcqRel);
                    events.push(event);
                }
                None => break,
            }
        }
        
        if !events.is_empty() {
            self.pop_count.fetch_add(events.len() as u64, Ordering::Relaxed);
        }
        events
    }
    
    /// Stop accepting events; buffered events stay drainable. Idempotent.
    pub fn complete_adding(&self) {
        self.closed.store(true, Ordering::Release);
    }
    
    pub fn is_adding_completed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
    
    /// Closed and nothing left to drain (including in-flight pushes)
    pub fn is_completed(&self) -> bool {
        self.is_adding_completed() && self.len() == 0
    }
    
    /// Get queue statistics
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.push_count.load(Ordering::Relaxed),
            pop_count: self.pop_count.load(Ordering::Relaxed),
            reject_count: self.reject_count.load(Ordering::Relaxed),
            current_size: self.len(),
            capacity: self.capacity,
        }
    }
    
    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    
    /// Check if queue is full (never true when unbounded)
    pub fn is_full(&self) -> bool {
        self.capacity.map_or(false, |capacity| self.len() >= capacity)
    }
    
    /// Get current queue length
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }
    
    /// Get queue capacity
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_adding_completed())
            .finish()
    }
}

/// Queue statistics
#[derive(Debug, Clone)]
pub struct QueueStats {
    /// Total events accepted
    pub push_count: u64,
    
    /// Total events drained
    pub pop_count: u64,
    
    /// Total events rejected (full or closed)
    pub reject_count: u64,
    
    /// Current queue size
    pub current_size: usize,
    
    /// Queue capacity
    pub capacity: Option<usize>,
}

impl QueueStats {
    /// Calculate fill percentage (0 when unbounded)
    pub fn fill_percentage(&self) -> f64 {
        match self.capacity {
            Some(capacity) if capacity > 0 => {
                (self.current_size as f64 / capacity as f64) * 100.0
            }
            _ => 0.0,
        }
    }
    
    /// Calculate reject rate over all admission attempts
    pub fn reject_rate(&self) -> f64 {
        let attempts = self.push_count + self.reject_count;
        if attempts == 0 {
            0.0
        } else {
            (self.reject_count as f64 / attempts as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventId, Level};
    use std::sync::Arc;
    
    fn create_test_event(message: &str) -> Event {
        Event::new(
            "Test",
            Level::Information,
            EventId::default(),
            Some(message.to_string()),
        )
    }
    
    #[test]
    fn test_queue_creation() {
        let queue = EventQueue::bounded(100);
        assert_eq!(queue.capacity(), Some(100));
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        
        let queue = EventQueue::unbounded();
        assert_eq!(queue.capacity(), None);
        assert!(!queue.is_full());
    }
    
    #[test]
    fn test_enqueue_drain_preserves_order() {
        let queue = EventQueue::bounded(10);
        
        for i in 0..5 {
            queue.try_enqueue(create_test_event(&format!("evt_{}", i))).unwrap();
        }
        assert_eq!(queue.len(), 5);
        
        let drained = queue.drain(3);
        let messages: Vec<_> = drained.iter().filter_map(|e| e.message()).collect();
        assert_eq!(messages, vec!["evt_0", "evt_1", "evt_2"]);
        assert_eq!(queue.len(), 2);
        
        let rest = queue.drain(usize::MAX);
        assert_eq!(rest.len(), 2);
        assert!(queue.is_empty());
    }
    
    #[test]
    fn test_drain_empty_returns_immediately() {
        let queue = EventQueue::unbounded();
        assert!(queue.drain(100).is_empty());
        assert!(queue.drain(0).is_empty());
    }
    
    #[test]
    fn test_queue_full() {
        let queue = EventQueue::bounded(2);
        
        queue.try_enqueue(create_test_event("evt_1")).unwrap();
        queue.try_enqueue(create_test_event("evt_2")).unwrap();
        
        assert!(queue.is_full());
        
        // Next enqueue is rejected and hands the event back
        let result = queue.try_enqueue(create_test_event("evt_3"));
        match result {
            Err(TryEnqueueError::Full(event)) => assert_eq!(event.message(), Some("evt_3")),
            other => panic!("expected Full, got {:?}", other),
        }
        
        let stats = queue.stats();
        assert_eq!(stats.reject_count, 1);
        assert_eq!(stats.fill_percentage(), 100.0);
        
        // Draining frees capacity again
        queue.drain(1);
        assert!(queue.try_enqueue(create_test_event("evt_4")).is_ok());
    }
    
    #[test]
    fn test_complete_adding() {
        let queue = EventQueue::unbounded();
        queue.try_enqueue(create_test_event("before")).unwrap();
        
        queue.complete_adding();
        queue.complete_adding();
        
        assert!(queue.is_adding_completed());
        assert!(!queue.is_completed());
        assert!(matches!(
            queue.try_enqueue(create_test_event("after")),
            Err(TryEnqueueError::Closed(_))
        ));
        
        // Buffered events remain drainable
        let drained = queue.drain(10);
        assert_eq!(drained.len(), 1);
        assert!(queue.is_completed());
    }
    
    #[test]
    fn test_stats() {
        let queue = EventQueue::bounded(10);
        
        queue.try_enqueue(create_test_event("evt_1")).unwrap();
        queue.try_enqueue(create_test_event("evt_2")).unwrap();
        queue.drain(1);
        
        let stats = queue.stats();
        assert_eq!(stats.push_count, 2);
        assert_eq!(stats.pop_count, 1);
        assert_eq!(stats.current_size, 1);
        assert_eq!(stats.reject_rate(), 0.0);
    }
    
    #[test]
    fn test_concurrent_producers_respect_capacity() {
        use std::thread;
        
        let queue = Arc::new(EventQueue::bounded(250));
        let mut handles = vec![];
        
        // Spawn 10 producer threads
        for i in 0..10 {
            let q = Arc::clone(&queue);
            let handle = thread::spawn(move || {
                let mut accepted = 0u64;
                for j in 0..100 {
                    let event = create_test_event(&format!("evt_{}_{}", i, j));
                    if q.try_enqueue(event).is_ok() {
                        accepted += 1;
                    }
                }
                accepted
            });
            handles.push(handle);
        }
        
        let accepted: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        
        let stats = queue.stats();
        assert_eq!(accepted, 250);
        assert_eq!(stats.push_count, 250);
        assert_eq!(stats.reject_count, 750);
        assert_eq!(queue.drain(usize::MAX).len(), 250);
    }
    
    #[test]
    fn test_single_producer_order_under_contention() {
        use std::thread;
        
        let queue = Arc::new(EventQueue::unbounded());
        let handles: Vec<_> = (0..4)
            .map(|p| {
                let q = Arc::clone(&queue);
                thread::spawn(move || {
                    for j in 0..200 {
                        q.try_enqueue(Event::new(
                            format!("P{}", p),
                            Level::Information,
                            EventId::new(j),
                            None,
                        ))
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        
        let drained = queue.drain(usize::MAX);
        assert_eq!(drained.len(), 800);
        for p in 0..4 {
            let category = format!("P{}", p);
            let ids: Vec<i32> = drained
                .iter()
                .filter(|e| e.category() == category)
                .map(|e| e.event_id().id)
                .collect();
            assert_eq!(ids, (0..200).collect::<Vec<_>>());
        }
    }
}
