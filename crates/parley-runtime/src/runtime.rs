//! The runtime shell around the dispatch layer.
//!
//! [`ParleyRuntime`] owns a channel adapter and an activity handler. For each
//! inbound activity it builds a [`TurnContext`], runs the handler inside a
//! `turn` span and logs the outcome. The handler result itself is returned
//! unchanged by [`ParleyRuntime::process_activity`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use parley_runtime::ParleyRuntime;
//!
//! let runtime = ParleyRuntime::builder()
//!     .adapter(MyChannel::new())
//!     .handler(EchoBot)
//!     .build()?;
//!
//! let (tx, rx) = runtime.inbound_channel();
//! // hand `tx` to the transport, then:
//! runtime.run_until_signal(rx).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span};

use crate::config::{ConfigLoader, ParleyConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use parley_core::{Activity, BoxedAdapter, ChannelAdapter, TurnContext, TurnResult};
use parley_framework::{ActivityHandler, BoxedHandler};

/// Runs turns for one adapter and one handler.
pub struct ParleyRuntime {
    config: ParleyConfig,
    adapter: BoxedAdapter,
    handler: BoxedHandler,
    /// Bounds the number of turns in flight in [`run`](Self::run).
    permits: Arc<Semaphore>,
    /// Parent of every turn's cancellation token.
    shutdown: CancellationToken,
}

impl ParleyRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &ParleyConfig {
        &self.config
    }

    pub fn adapter(&self) -> &BoxedAdapter {
        &self.adapter
    }

    /// A channel sized by `runtime.inbound_buffer`, for feeding [`run`](Self::run).
    pub fn inbound_channel(&self) -> (mpsc::Sender<Activity>, mpsc::Receiver<Activity>) {
        mpsc::channel(self.config.runtime.inbound_buffer)
    }

    /// Processes one activity to completion on the current task.
    ///
    /// Returns exactly what the handler returned, including contract
    /// violations such as a missing type tag.
    pub async fn process_activity(&self, activity: Activity) -> TurnResult {
        execute_turn(
            Arc::clone(&self.handler),
            Arc::clone(&self.adapter),
            self.shutdown.child_token(),
            activity,
        )
        .await
    }

    /// Processes activities from `inbound` until the channel closes or
    /// [`shutdown`](Self::shutdown) is called, then waits for the turns that
    /// are still running.
    ///
    /// Turns run concurrently, at most `runtime.max_concurrent_turns` at a
    /// time. Each turn's outcome is logged; a failing turn does not stop the
    /// loop.
    pub async fn run(&self, mut inbound: mpsc::Receiver<Activity>) -> RuntimeResult<()> {
        let mut turns = JoinSet::new();

        info!(
            adapter = self.adapter.name(),
            max_concurrent_turns = self.config.runtime.max_concurrent_turns,
            "Parley runtime is running"
        );

        loop {
            let activity = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                next = inbound.recv() => match next {
                    Some(activity) => activity,
                    None => {
                        debug!("Inbound channel closed");
                        break;
                    }
                },
            };

            let permit = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                permit = Arc::clone(&self.permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let handler = Arc::clone(&self.handler);
            let adapter = Arc::clone(&self.adapter);
            let cancellation = self.shutdown.child_token();
            turns.spawn(async move {
                let _permit = permit;
                // Outcome is logged inside the turn span.
                let _ = execute_turn(handler, adapter, cancellation, activity).await;
            });

            while let Some(joined) = turns.try_join_next() {
                log_join(joined);
            }
        }

        if !turns.is_empty() {
            info!(in_flight = turns.len(), "Waiting for in-flight turns");
        }
        while let Some(joined) = turns.join_next().await {
            log_join(joined);
        }

        info!("Parley runtime stopped");
        Ok(())
    }

    /// Like [`run`](Self::run), but also stops on Ctrl+C or SIGTERM.
    pub async fn run_until_signal(&self, inbound: mpsc::Receiver<Activity>) -> RuntimeResult<()> {
        let run = self.run(inbound);
        tokio::pin!(run);

        tokio::select! {
            result = &mut run => return result,
            signal = wait_for_signal() => {
                signal?;
                self.shutdown();
            }
        }

        run.await
    }

    /// Requests shutdown. Every running turn sees its cancellation token fire.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutdown requested");
            self.shutdown.cancel();
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl std::fmt::Debug for ParleyRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParleyRuntime")
            .field("adapter", &self.adapter.name())
            .field("config", &self.config)
            .field("shutting_down", &self.shutdown.is_cancelled())
            .finish()
    }
}

async fn execute_turn(
    handler: BoxedHandler,
    adapter: BoxedAdapter,
    cancellation: CancellationToken,
    activity: Activity,
) -> TurnResult {
    let span = info_span!(
        "turn",
        activity_type = activity.activity_type.as_deref().unwrap_or_default(),
        activity_id = activity.id.as_deref().unwrap_or_default(),
        channel = activity.channel_id.as_deref().unwrap_or_default(),
    );
    let turn = TurnContext::new(adapter, activity).with_cancellation(cancellation);

    async move {
        let result = handler.on_turn(&turn).await;
        match &result {
            Ok(()) => debug!(responded = turn.responded(), "Turn completed"),
            Err(err) => error!(error = %err, "Turn failed"),
        }
        result
    }
    .instrument(span)
    .await
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined
        && err.is_panic()
    {
        error!(error = %err, "Turn task panicked");
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM.
async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for [`ParleyRuntime`].
///
/// Without an explicit [`config`](Self::config) the builder loads one with
/// [`ConfigLoader`] from the current directory, the user config directory
/// and `PARLEY_*` variables.
pub struct RuntimeBuilder {
    adapter: Option<BoxedAdapter>,
    handler: Option<BoxedHandler>,
    config: Option<ParleyConfig>,
    config_loader: ConfigLoader,
    init_logging: bool,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            adapter: None,
            handler: None,
            config: None,
            config_loader: ConfigLoader::new(),
            init_logging: true,
        }
    }

    pub fn adapter(mut self, adapter: impl ChannelAdapter + 'static) -> Self {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    pub fn shared_adapter(mut self, adapter: BoxedAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn handler(mut self, handler: impl ActivityHandler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn shared_handler(mut self, handler: BoxedHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Uses `config` as is; no files or environment variables are read.
    pub fn config(mut self, config: ParleyConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Leaves the global tracing subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn build(self) -> RuntimeResult<ParleyRuntime> {
        let config = match self.config {
            Some(config) => {
                validate_config(&config)?;
                config
            }
            None => self.config_loader.load()?,
        };

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let adapter = self.adapter.ok_or(RuntimeError::MissingComponent("adapter"))?;
        let handler = self.handler.ok_or(RuntimeError::MissingComponent("handler"))?;

        info!(
            adapter = adapter.name(),
            log_level = %config.logging.level,
            max_concurrent_turns = config.runtime.max_concurrent_turns,
            "Runtime initialized from configuration"
        );

        Ok(ParleyRuntime {
            permits: Arc::new(Semaphore::new(config.runtime.max_concurrent_turns)),
            shutdown: CancellationToken::new(),
            config,
            adapter,
            handler,
        })
    }
}
