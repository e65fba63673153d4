use std::time::Duration;

use courier_api::{ActorError, ActorResult};

pub const DEFAULT_THREAD_NAME_PREFIX: &str = "courier-actor";
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// --- Runtime Configuration ---

/// Configuration for the `ThreadRuntime`.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Prefix of actor thread names; the actor id is appended.
    pub thread_name_prefix: String,

    /// Default stack size for actor threads. `None` uses the platform default.
    pub stack_size: Option<usize>,

    /// How long `shutdown` waits for actors to terminate.
    pub shutdown_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl RuntimeConfig {
    /// Merge runtime configuration with actor-specific configuration.
    /// Runtime defaults apply where the actor config doesn't specify values.
    pub fn merge_with_actor_config(&self, actor_config: &ActorConfig) -> ActorResult<ActorConfig> {
        if actor_config.name.as_deref().is_some_and(str::is_empty) {
            return Err(ActorError::Argument("actor name must not be empty".to_string()));
        }

        let stack_size = actor_config.stack_size.or(self.stack_size);
        if stack_size == Some(0) {
            return Err(ActorError::Argument("stack size must be greater than zero".to_string()));
        }

        Ok(ActorConfig {
            name: actor_config.name.clone(),
            stack_size,
        })
    }
}

// --- Actor Configuration ---

/// Configuration for individual actors, potentially overriding runtime defaults.
#[derive(Clone, Debug, Default)]
pub struct ActorConfig {
    /// Human-readable name, used in diagnostics and `RemoteError`.
    pub name: Option<String>,

    /// Stack size of this actor's thread.
    pub stack_size: Option<usize>,
}

impl ActorConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }
}
