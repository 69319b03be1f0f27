pub mod affinity;
pub mod counter;
pub mod dispatcher;
pub mod events;
pub mod publish;
pub mod replication;
pub mod selector;

#[cfg(test)]
pub(crate) mod testing;
