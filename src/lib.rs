// label-flow library - shipping label creation workflow engine
// This exposes the core components for the binary, testing and integration

pub mod cli;
pub mod config;
pub mod observability;
pub mod shipping_label;
pub mod shutdown;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{config, init_config, LabelFlowConfig};
pub use observability::{OperationTimer, ValidationMetrics, ValidationStats};
pub use shipping_label::{
    AddressValidator, Data, EffectDispatcher, Event, LabelCreationSession, LabelRepository,
    SessionHandle, SessionOptions, ShippingLabelsStateMachine, SideEffect, StepRegistry, ViewState,
};
pub use shutdown::ShutdownCoordinator;
pub use telemetry::{create_session_span, generate_correlation_id, init_telemetry};
