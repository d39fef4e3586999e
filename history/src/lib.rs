//! # ECS History
//! Transactional change tracking for entity-component stores: mutations are
//! gathered into invertible, versioned commits, kept in a linear history,
//! exchanged between replicas, and reconciled by rolling back and rebasing
//! when histories diverge.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use ecs_history_serde::{
    ByteCounter, ByteReader, ByteWrite, ByteWriter, ConstByteLength, Serde, SerdeErr,
};

mod commit;
mod error;
mod history;
mod serialization;
mod world;

pub use commit::{
    apply_commit, can_apply, create_commit, ChangeApplier, Commit, CommitBuilder, CommitId,
    CommitIdGenerator, WorldContext,
};
pub use error::HistoryError;
pub use history::{History, HistoryConfig, HistoryEntry, Reconciliation, WireMode};
pub use serialization::{
    ChangeSerializer, CommitMessage, CommitReader, CommitWriter, SnapshotReader, SnapshotWriter,
};
pub use world::{
    component::{
        AnyChangeAdapter, AnyChangeVisitor, Change, ChangeKind, ChangeSet, ChangeSetDyn,
        ChangeVisitor, Component, ComponentError, ComponentHandler, ComponentKind, ComponentKinds,
        DefaultComponentHandler, DynComponent,
    },
    entity::{EntityError, EntityVersion, EntityVersions, StableEntity, StableEntityMap},
    gather::{
        ChangeBuffer, ChangeChannel, ChangeReceiver, ChangeSender, ComponentMonitor,
        ComponentMonitorDyn, GatherPause, GatherStrategy, ReactiveGatherStrategy,
    },
    world_type::{WorldMutType, WorldRefType},
};
