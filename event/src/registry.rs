//! Event registry.
//!
//! Typed records describing how to recognise, decode and handle each event
//! kind on both delivery paths, and the immutable registry built from them.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ParseError, RegistryError};
use crate::handler::EventHandler;
use crate::types::{ContractAddress, Event, EventType, MempoolEventType, NotaryRequest, StackItem};

/// Pure decoder for notification stack items.
pub type ParserFn = fn(&[StackItem]) -> Result<Event, ParseError>;

/// Pure decoder for notary requests.
pub type NotaryParserFn = fn(&NotaryRequest) -> Result<Event, ParseError>;

/// Lookup key of the notification path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    /// Event kind.
    pub event_type: EventType,
    /// Emitting contract.
    pub contract: ContractAddress,
}

impl NotificationKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(event_type: EventType, contract: ContractAddress) -> Self {
        Self {
            event_type,
            contract,
        }
    }
}

impl fmt::Display for NotificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.event_type, self.contract)
    }
}

/// Lookup key of the notary path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotaryKey {
    /// Mempool condition that triggers the lookup.
    pub mempool_type: MempoolEventType,
    /// Event kind.
    pub event_type: EventType,
    /// Invoked contract.
    pub contract: ContractAddress,
}

impl NotaryKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(
        mempool_type: MempoolEventType,
        event_type: EventType,
        contract: ContractAddress,
    ) -> Self {
        Self {
            mempool_type,
            event_type,
            contract,
        }
    }
}

impl fmt::Display for NotaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} (mempool {})",
            self.event_type.notary_method(),
            self.contract,
            self.mempool_type
        )
    }
}

/// Notification decoder registration.
#[derive(Clone)]
pub struct ParserInfo {
    key: NotificationKey,
    parser: ParserFn,
}

impl ParserInfo {
    /// Creates a registration.
    #[must_use]
    pub fn new(event_type: EventType, contract: ContractAddress, parser: ParserFn) -> Self {
        Self {
            key: NotificationKey::new(event_type, contract),
            parser,
        }
    }

    /// Returns the lookup key.
    #[must_use]
    pub const fn key(&self) -> NotificationKey {
        self.key
    }

    /// Decodes notification stack items.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error for malformed payloads.
    pub fn parse(&self, items: &[StackItem]) -> Result<Event, ParseError> {
        (self.parser)(items)
    }
}

impl fmt::Debug for ParserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserInfo").field("key", &self.key).finish()
    }
}

/// Notification handler registration.
#[derive(Clone)]
pub struct HandlerInfo {
    key: NotificationKey,
    handler: Arc<dyn EventHandler>,
}

impl HandlerInfo {
    /// Creates a registration.
    #[must_use]
    pub fn new(
        event_type: EventType,
        contract: ContractAddress,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            key: NotificationKey::new(event_type, contract),
            handler,
        }
    }

    /// Returns the lookup key.
    #[must_use]
    pub const fn key(&self) -> NotificationKey {
        self.key
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> Arc<dyn EventHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for HandlerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerInfo").field("key", &self.key).finish()
    }
}

/// Notary request decoder registration.
#[derive(Clone)]
pub struct NotaryParserInfo {
    key: NotaryKey,
    parser: NotaryParserFn,
}

impl NotaryParserInfo {
    /// Creates a registration.
    #[must_use]
    pub fn new(
        mempool_type: MempoolEventType,
        event_type: EventType,
        contract: ContractAddress,
        parser: NotaryParserFn,
    ) -> Self {
        Self {
            key: NotaryKey::new(mempool_type, event_type, contract),
            parser,
        }
    }

    /// Returns the lookup key.
    #[must_use]
    pub const fn key(&self) -> NotaryKey {
        self.key
    }

    /// Decodes a notary request.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error for malformed requests.
    pub fn parse(&self, request: &NotaryRequest) -> Result<Event, ParseError> {
        (self.parser)(request)
    }
}

impl fmt::Debug for NotaryParserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotaryParserInfo")
            .field("key", &self.key)
            .finish()
    }
}

/// Notary handler registration.
#[derive(Clone)]
pub struct NotaryHandlerInfo {
    key: NotaryKey,
    handler: Arc<dyn EventHandler>,
}

impl NotaryHandlerInfo {
    /// Creates a registration.
    #[must_use]
    pub fn new(
        mempool_type: MempoolEventType,
        event_type: EventType,
        contract: ContractAddress,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            key: NotaryKey::new(mempool_type, event_type, contract),
            handler,
        }
    }

    /// Returns the lookup key.
    #[must_use]
    pub const fn key(&self) -> NotaryKey {
        self.key
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> Arc<dyn EventHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for NotaryHandlerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotaryHandlerInfo")
            .field("key", &self.key)
            .finish()
    }
}

/// Producer of registrations for the ledger watcher.
///
/// Implemented by every contract processor.
pub trait ListenerSource {
    /// Returns notification decoders.
    fn listener_notification_parsers(&self) -> Vec<ParserInfo>;

    /// Returns notification handlers.
    fn listener_notification_handlers(&self) -> Vec<HandlerInfo>;

    /// Returns notary request decoders.
    fn listener_notary_parsers(&self) -> Vec<NotaryParserInfo>;

    /// Returns notary request handlers.
    fn listener_notary_handlers(&self) -> Vec<NotaryHandlerInfo>;

    /// Returns handlers for timer events.
    fn timers_handlers(&self) -> Vec<HandlerInfo> {
        Vec::new()
    }
}

/// Immutable set of registrations owned by one processor.
#[derive(Debug, Default)]
pub struct EventRegistry {
    notification_parsers: HashMap<NotificationKey, ParserInfo>,
    notification_handlers: HashMap<NotificationKey, HandlerInfo>,
    notary_parsers: HashMap<NotaryKey, NotaryParserInfo>,
    notary_handlers: HashMap<NotaryKey, NotaryHandlerInfo>,
}

impl EventRegistry {
    /// Creates an empty registry builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Builds a registry from a processor's registrations.
    ///
    /// # Errors
    ///
    /// Returns an error if any collection contains a duplicate key.
    pub fn from_source(source: &dyn ListenerSource) -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        for info in source.listener_notification_parsers() {
            builder.add_notification_parser(info)?;
        }
        for info in source.listener_notification_handlers() {
            builder.add_notification_handler(info)?;
        }
        for info in source.listener_notary_parsers() {
            builder.add_notary_parser(info)?;
        }
        for info in source.listener_notary_handlers() {
            builder.add_notary_handler(info)?;
        }
        Ok(builder.build())
    }

    /// Looks up a notification decoder.
    #[must_use]
    pub fn notification_parser(&self, key: &NotificationKey) -> Option<&ParserInfo> {
        self.notification_parsers.get(key)
    }

    /// Looks up a notification handler.
    #[must_use]
    pub fn notification_handler(&self, key: &NotificationKey) -> Option<&HandlerInfo> {
        self.notification_handlers.get(key)
    }

    /// Looks up a notary request decoder.
    #[must_use]
    pub fn notary_parser(&self, key: &NotaryKey) -> Option<&NotaryParserInfo> {
        self.notary_parsers.get(key)
    }

    /// Looks up a notary request handler.
    #[must_use]
    pub fn notary_handler(&self, key: &NotaryKey) -> Option<&NotaryHandlerInfo> {
        self.notary_handlers.get(key)
    }

    /// Iterates over notification decoders.
    pub fn notification_parsers(&self) -> impl Iterator<Item = &ParserInfo> {
        self.notification_parsers.values()
    }

    /// Iterates over notification handlers.
    pub fn notification_handlers(&self) -> impl Iterator<Item = &HandlerInfo> {
        self.notification_handlers.values()
    }

    /// Iterates over notary request decoders.
    pub fn notary_parsers(&self) -> impl Iterator<Item = &NotaryParserInfo> {
        self.notary_parsers.values()
    }

    /// Iterates over notary request handlers.
    pub fn notary_handlers(&self) -> impl Iterator<Item = &NotaryHandlerInfo> {
        self.notary_handlers.values()
    }

    /// Returns true if the notification path has no registrations.
    #[must_use]
    pub fn notification_path_is_empty(&self) -> bool {
        self.notification_parsers.is_empty() && self.notification_handlers.is_empty()
    }

    /// Returns true if the notary path has no registrations.
    #[must_use]
    pub fn notary_path_is_empty(&self) -> bool {
        self.notary_parsers.is_empty() && self.notary_handlers.is_empty()
    }
}

/// Builder rejecting duplicate keys.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    inner: EventRegistry,
}

impl RegistryBuilder {
    /// Adds a notification decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is already registered.
    pub fn add_notification_parser(&mut self, info: ParserInfo) -> Result<(), RegistryError> {
        match self.inner.notification_parsers.entry(info.key()) {
            Entry::Occupied(e) => Err(RegistryError::DuplicateParser(*e.key())),
            Entry::Vacant(e) => {
                e.insert(info);
                Ok(())
            }
        }
    }

    /// Adds a notification handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is already registered.
    pub fn add_notification_handler(&mut self, info: HandlerInfo) -> Result<(), RegistryError> {
        match self.inner.notification_handlers.entry(info.key()) {
            Entry::Occupied(e) => Err(RegistryError::DuplicateHandler(*e.key())),
            Entry::Vacant(e) => {
                e.insert(info);
                Ok(())
            }
        }
    }

    /// Adds a notary request decoder.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is already registered.
    pub fn add_notary_parser(&mut self, info: NotaryParserInfo) -> Result<(), RegistryError> {
        match self.inner.notary_parsers.entry(info.key()) {
            Entry::Occupied(e) => Err(RegistryError::DuplicateNotaryParser(*e.key())),
            Entry::Vacant(e) => {
                e.insert(info);
                Ok(())
            }
        }
    }

    /// Adds a notary request handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is already registered.
    pub fn add_notary_handler(&mut self, info: NotaryHandlerInfo) -> Result<(), RegistryError> {
        match self.inner.notary_handlers.entry(info.key()) {
            Entry::Occupied(e) => Err(RegistryError::DuplicateNotaryHandler(*e.key())),
            Entry::Vacant(e) => {
                e.insert(info);
                Ok(())
            }
        }
    }

    /// Finishes the registry.
    #[must_use]
    pub fn build(self) -> EventRegistry {
        self.inner
    }
}
