#![allow(dead_code, unused_imports)]

pub use docrun_test_utils::builders;
pub use docrun_test_utils::fake_executor::{ExecutedStep, FakeExecutor};
pub use docrun_test_utils::{init_tracing, with_timeout};

use docrun::config::PipelineSection;

/// Pipeline settings with trivially-named collaborators, for tests that
/// never spawn real processes.
pub fn fake_pipeline() -> PipelineSection {
    PipelineSection {
        generator: vec!["gen".to_string()],
        renderer: vec!["render".to_string()],
        server: vec!["serve-files".to_string()],
        ..PipelineSection::default()
    }
}
