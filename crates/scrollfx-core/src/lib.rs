pub mod animation;
pub mod config;
pub mod easing;
pub mod effects;
pub mod engine;
pub mod error;
pub mod frame;
pub mod host;
pub mod interpolate;
pub mod page;
pub mod scenario;
pub mod scheduler;
pub mod trigger;
pub mod value;

pub use animation::{AnimationId, AnimationOptions, PropertySpec};
pub use config::{AppConfig, EngineConfig};
pub use easing::{Easing, Timing};
pub use engine::{Scene, ScrollEngine};
pub use error::{Error, Result};
pub use frame::{Fault, FrameContext, FrameReport, FrameSample};
pub use host::{Device, Host, NodeOps, PropertySink, Rect, TargetId, Viewport};
pub use page::Page;
pub use scenario::{FrameRecord, Scenario, ScenarioRuntime, TriggerSnapshot};
pub use scheduler::{FrameScheduler, FrameToken, ManualFrames, Ticker};
pub use trigger::{Offset, Trigger, TriggerEventKind, TriggerId, TriggerOptions};
pub use value::{Rgb, Value};
