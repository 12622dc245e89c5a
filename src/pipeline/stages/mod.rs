// Pipeline stages, in execution order
//
// Each stage declares its own precondition and failure policy; the
// orchestrator decides whether to run it and how to treat its failure.

#[path = "01_toolchain.rs"]
pub mod toolchain;
#[path = "02_pins.rs"]
pub mod pins;
#[path = "03_source.rs"]
pub mod source;
#[path = "04_overlay.rs"]
pub mod overlay;
#[path = "05_patch.rs"]
pub mod patch;
#[path = "06_build.rs"]
pub mod build;
#[path = "07_artifact.rs"]
pub mod artifact;

pub use artifact::ArtifactCollector;
pub use build::BuildExecutor;
pub use overlay::OverlayMirror;
pub use patch::PatchApplier;
pub use pins::PinConfigWriter;
pub use source::SourceAcquirer;
pub use toolchain::ToolchainBootstrapper;
