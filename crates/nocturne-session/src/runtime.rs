//! The control context: one thread owning the [`SessionController`].
//!
//! Collaborators and UI talk to it through a cloneable [`ControlHandle`].
//! Commands arrive over a channel; between commands the thread waits with
//! `recv_timeout` until the controller's next scheduled deadline.

use crate::controller::SessionController;
use crate::observer::{Notifier, SessionSnapshot, Subscription};
use crate::state::PauseReason;
use crate::{Error, Result, Settings};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use nocturne_core::OutputRoute;
use nocturne_synth::PresetId;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

type Reply = Sender<Result<()>>;

enum Command {
    Play(PresetId, Reply),
    Stop(Option<f32>),
    StopAndWait(Option<f32>, Box<dyn FnOnce(&mut SessionController) + Send>),
    Pause(PauseReason),
    Resume(Reply),
    UpdateSettings(Settings),
    RouteChanged(OutputRoute),
    UnsafeRoute,
    InterruptionBegan,
    InterruptionEnded { should_resume: bool },
    SystemVolume(f32),
    BreakStarted,
    BreakEnded,
    Shutdown,
}

/// Cloneable way into the control context.
#[derive(Clone)]
pub struct ControlHandle {
    commands: Sender<Command>,
    notifier: Notifier,
}

impl ControlHandle {
    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Session runtime gone, dropping command");
        }
    }

    fn request(&self, make: impl FnOnce(Reply) -> Command) -> Result<()> {
        let (reply, response) = bounded(1);
        self.commands
            .send(make(reply))
            .map_err(|_| Error::RuntimeUnavailable)?;
        response.recv().map_err(|_| Error::RuntimeUnavailable)?
    }

    /// Blocks until the preset is playing or has failed.
    pub fn play(&self, preset: PresetId) -> Result<()> {
        self.request(|reply| Command::Play(preset, reply))
    }

    /// Stop with the configured default fade.
    pub fn stop(&self) {
        self.send(Command::Stop(None));
    }

    pub fn stop_with_fade(&self, fade_out_secs: f32) {
        self.send(Command::Stop(Some(fade_out_secs)));
    }

    /// Stop, then run `completion` on the control context once teardown is
    /// done. Pass `None` for the default fade.
    pub fn stop_and_wait<F>(&self, fade_out_secs: Option<f32>, completion: F)
    where
        F: FnOnce(&mut SessionController) + Send + 'static,
    {
        self.send(Command::StopAndWait(fade_out_secs, Box::new(completion)));
    }

    /// Fade out the current preset and start `preset` once it is gone.
    pub fn switch_to(&self, preset: PresetId) {
        self.stop_and_wait(None, move |controller| {
            if let Err(e) = controller.play(preset) {
                warn!(preset = %preset, error = %e, "Switching preset failed");
            }
        });
    }

    pub fn pause(&self, reason: PauseReason) {
        self.send(Command::Pause(reason));
    }

    /// Blocks until resumed, refused or ignored.
    pub fn resume(&self) -> Result<()> {
        self.request(Command::Resume)
    }

    pub fn update_settings(&self, settings: Settings) {
        self.send(Command::UpdateSettings(settings));
    }

    pub fn route_changed(&self, route: OutputRoute) {
        self.send(Command::RouteChanged(route));
    }

    pub fn unsafe_route(&self) {
        self.send(Command::UnsafeRoute);
    }

    pub fn interruption_began(&self) {
        self.send(Command::InterruptionBegan);
    }

    pub fn interruption_ended(&self, should_resume: bool) {
        self.send(Command::InterruptionEnded { should_resume });
    }

    pub fn system_volume_changed(&self, volume: f32) {
        self.send(Command::SystemVolume(volume));
    }

    pub fn break_started(&self) {
        self.send(Command::BreakStarted);
    }

    pub fn break_ended(&self) {
        self.send(Command::BreakEnded);
    }

    /// Latest published state. Lock-free.
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.notifier.snapshot()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }
}

/// Owns the control thread.
pub struct SessionRuntime {
    handle: ControlHandle,
    thread: Option<JoinHandle<SessionController>>,
}

impl SessionRuntime {
    pub fn spawn(controller: SessionController) -> Result<Self> {
        let (commands, inbox) = unbounded();
        let notifier = controller.notifier().clone();
        let thread = thread::Builder::new()
            .name("nocturne-session".into())
            .spawn(move || run(controller, inbox))
            .map_err(Error::Spawn)?;

        Ok(Self {
            handle: ControlHandle { commands, notifier },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> ControlHandle {
        self.handle.clone()
    }

    /// Tear down playback, stop the thread and hand back the controller.
    pub fn shutdown(mut self) -> Result<SessionController> {
        self.join().ok_or(Error::RuntimeUnavailable)
    }

    fn join(&mut self) -> Option<SessionController> {
        let thread = self.thread.take()?;
        let _ = self.handle.commands.send(Command::Shutdown);
        match thread.join() {
            Ok(controller) => Some(controller),
            Err(_) => {
                warn!("Session runtime panicked");
                None
            }
        }
    }
}

impl Drop for SessionRuntime {
    fn drop(&mut self) {
        self.join();
    }
}

fn run(mut controller: SessionController, inbox: Receiver<Command>) -> SessionController {
    debug!("Session runtime started");
    loop {
        controller.poll();

        let command = match controller.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_sub(controller.now());
                match inbox.recv_timeout(wait) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match inbox.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        if !dispatch(&mut controller, command) {
            break;
        }
    }
    controller.shutdown();
    debug!("Session runtime stopped");
    controller
}

/// Returns false on shutdown.
fn dispatch(controller: &mut SessionController, command: Command) -> bool {
    match command {
        Command::Play(preset, reply) => {
            let _ = reply.send(controller.play(preset));
        }
        Command::Stop(fade) => {
            let secs = fade.unwrap_or(controller.config().default_stop_fade_secs);
            controller.stop(secs);
        }
        Command::StopAndWait(fade, completion) => {
            let secs = fade.unwrap_or(controller.config().default_stop_fade_secs);
            controller.stop_and_wait(secs, completion);
        }
        Command::Pause(reason) => controller.pause(reason),
        Command::Resume(reply) => {
            let _ = reply.send(controller.resume());
        }
        Command::UpdateSettings(settings) => controller.update_settings(settings),
        Command::RouteChanged(route) => controller.on_route_changed(route),
        Command::UnsafeRoute => controller.on_unsafe_route(),
        Command::InterruptionBegan => controller.on_interruption_began(),
        Command::InterruptionEnded { should_resume } => {
            controller.on_interruption_ended(should_resume)
        }
        Command::SystemVolume(volume) => controller.on_system_volume_changed(volume),
        Command::BreakStarted => controller.on_break_started(),
        Command::BreakEnded => controller.on_break_ended(),
        Command::Shutdown => return false,
    }
    true
}
