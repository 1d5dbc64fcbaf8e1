use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};

use super::sink::create_sink;
use super::types::{
    AudioCmd, AudioError, EngineEventKind, EventEmitter, PlaybackHandle, PlaybackInfo, ResourceId,
};

/// The one resource the audio thread is responsible for.
struct Slot {
    id: ResourceId,
    emitter: EventEmitter,
    sink: Option<Sink>,
    duration: Option<Duration>,
    volume: f32,
    want_play: bool,
    ended: bool,
}

impl Slot {
    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }
}

fn publish(info: &PlaybackHandle, f: impl FnOnce(&mut PlaybackInfo)) {
    if let Ok(mut i) = info.lock() {
        f(&mut i);
    }
}

fn ms(d: Duration) -> u64 {
    d.as_millis() as u64
}

/// Spawn the audio thread. `ready` receives `Ok(())` once the output device is
/// open, or the reason it could not be.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    info: PlaybackHandle,
    tick: Duration,
    ready: Sender<Result<(), AudioError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(AudioError::OutputUnavailable(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped; that would land on the terminal.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));

        let mut slot: Option<Slot> = None;

        loop {
            match rx.recv_timeout(tick) {
                Ok(cmd) => match cmd {
                    AudioCmd::Open {
                        id,
                        volume,
                        emitter,
                    } => {
                        if let Some(mut old) = slot.take() {
                            old.stop();
                        }
                        slot = Some(Slot {
                            id,
                            emitter,
                            sink: None,
                            duration: None,
                            volume,
                            want_play: false,
                            ended: false,
                        });
                        publish(&info, |i| {
                            *i = PlaybackInfo {
                                resource: Some(id),
                                ..PlaybackInfo::default()
                            }
                        });
                    }

                    AudioCmd::Data { id, bytes } => {
                        let Some(s) = slot.as_mut().filter(|s| s.id == id) else {
                            continue;
                        };
                        match create_sink(&stream, bytes, s.volume) {
                            Ok((sink, duration)) => {
                                if s.want_play {
                                    sink.play();
                                }
                                s.duration = duration;
                                s.sink = Some(sink);
                                let playing = s.want_play;
                                publish(&info, |i| {
                                    i.duration = duration;
                                    i.playing = playing;
                                });
                            }
                            Err(e) => {
                                tracing::warn!(resource = id.get(), error = %e, "stream decode failed");
                                s.emitter.emit(EngineEventKind::Error(e.to_string()));
                            }
                        }
                    }

                    AudioCmd::FetchFailed { id, reason } => {
                        if let Some(s) = slot.as_ref().filter(|s| s.id == id) {
                            tracing::warn!(resource = id.get(), %reason, "stream download failed");
                            s.emitter.emit(EngineEventKind::Error(reason));
                        }
                    }

                    AudioCmd::Play(id) => {
                        if let Some(s) = slot.as_mut().filter(|s| s.id == id) {
                            s.want_play = true;
                            if let Some(ref sink) = s.sink {
                                sink.play();
                                publish(&info, |i| i.playing = true);
                            }
                        }
                    }

                    AudioCmd::Pause(id) => {
                        if let Some(s) = slot.as_mut().filter(|s| s.id == id) {
                            s.want_play = false;
                            if let Some(ref sink) = s.sink {
                                sink.pause();
                            }
                            publish(&info, |i| i.playing = false);
                        }
                    }

                    AudioCmd::Seek { id, position } => {
                        if let Some(s) = slot.as_mut().filter(|s| s.id == id) {
                            if let Some(ref sink) = s.sink {
                                if let Err(e) = sink.try_seek(position) {
                                    tracing::warn!(resource = id.get(), error = %e, "seek failed");
                                    continue;
                                }
                                s.ended = false;
                                publish(&info, |i| i.position = position);
                            }
                        }
                    }

                    AudioCmd::SetVolume { id, volume } => {
                        if let Some(s) = slot.as_mut().filter(|s| s.id == id) {
                            s.volume = volume;
                            if let Some(ref sink) = s.sink {
                                sink.set_volume(volume);
                            }
                        }
                    }

                    AudioCmd::Release(id) => {
                        if slot.as_ref().is_some_and(|s| s.id == id) {
                            if let Some(mut s) = slot.take() {
                                s.stop();
                            }
                            publish(&info, |i| *i = PlaybackInfo::default());
                        }
                    }

                    AudioCmd::Quit => {
                        if let Some(mut s) = slot.take() {
                            s.stop();
                        }
                        publish(&info, |i| i.playing = false);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    // Periodic progress report and end-of-stream detection.
                    let Some(s) = slot.as_mut() else {
                        continue;
                    };
                    let Some(ref sink) = s.sink else {
                        continue;
                    };
                    if !s.want_play || s.ended {
                        continue;
                    }

                    if sink.empty() {
                        s.ended = true;
                        s.want_play = false;
                        publish(&info, |i| {
                            i.playing = false;
                            if let Some(d) = s.duration {
                                i.position = d;
                            }
                        });
                        s.emitter.emit(EngineEventKind::Ended);
                    } else {
                        let pos = sink.get_pos();
                        publish(&info, |i| i.position = pos);
                        s.emitter.emit(EngineEventKind::Progress {
                            current_ms: ms(pos),
                            duration_ms: s.duration.map(ms),
                        });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
