//! Terminal input merged with the kiosk's clocks.
//!
//! One background task turns crossterm input into [`Event`]s and interleaves
//! three timers: the animation tick, the frame clock, and an idle timer
//! that fires once whenever the keyboard has been quiet for a while. The
//! cadence comes from the `[refresh]` section of the configuration.

use std::io;
use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::{Stream, StreamExt};
use skylight_core::RefreshConfig;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    /// Repaint from scratch: the terminal was resized or regained focus.
    Redraw,
    /// Animation step.
    Tick,
    /// Time to draw the next frame.
    Frame,
    /// No key for the idle period. Sent once per quiet spell.
    Idle,
}

/// How often the reader emits its timed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub tick: Duration,
    pub frame: Duration,
    /// `None` never sends [`Event::Idle`].
    pub idle: Option<Duration>,
}

impl Cadence {
    pub fn from_refresh(refresh: &RefreshConfig) -> Self {
        Self {
            tick: refresh.ui_tick(),
            frame: refresh.frame(),
            idle: refresh.idle(),
        }
    }
}

/// The kiosk only cares about key presses, resizes and regained focus.
fn translate(event: TermEvent) -> Option<Event> {
    match event {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        TermEvent::Resize(..) | TermEvent::FocusGained => Some(Event::Redraw),
        _ => None,
    }
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventReader {
    /// Read the terminal until `cancel` fires or the reader is dropped.
    pub fn spawn(cadence: Cadence, cancel: CancellationToken) -> Self {
        Self::from_stream(EventStream::new(), cadence, cancel)
    }

    fn from_stream<S>(input: S, cadence: Cadence, cancel: CancellationToken) -> Self
    where
        S: Stream<Item = io::Result<TermEvent>> + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(input, cadence, tx, cancel));
        Self { rx }
    }

    /// `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

async fn pump<S>(
    mut input: S,
    cadence: Cadence,
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
) where
    S: Stream<Item = io::Result<TermEvent>> + Unpin,
{
    let mut tick = tokio::time::interval(cadence.tick);
    let mut frame = tokio::time::interval(cadence.frame);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let idle = tokio::time::sleep(cadence.idle.unwrap_or(Duration::MAX));
    tokio::pin!(idle);
    let mut idle_armed = cadence.idle.is_some();

    loop {
        let event = tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            raw = input.next() => match raw {
                Some(Ok(raw)) => {
                    let Some(event) = translate(raw) else { continue };
                    if let (Event::Key(_), Some(after)) = (&event, cadence.idle) {
                        idle.as_mut().reset(Instant::now() + after);
                        idle_armed = true;
                    }
                    event
                }
                Some(Err(e)) => {
                    warn!(error = %e, "terminal input error");
                    continue;
                }
                None => break,
            },

            () = &mut idle, if idle_armed => {
                idle_armed = false;
                Event::Idle
            }

            _ = tick.tick() => Event::Tick,

            _ = frame.tick() => Event::Frame,
        };

        if tx.send(event).is_err() {
            break;
        }
    }
    debug!("event reader stopped");
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};
    use futures::stream;

    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn cadence(idle: Option<Duration>) -> Cadence {
        Cadence {
            tick: HOUR,
            frame: HOUR,
            idle,
        }
    }

    fn key(c: char, kind: KeyEventKind) -> io::Result<TermEvent> {
        let mut key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        key.kind = kind;
        Ok(TermEvent::Key(key))
    }

    /// Next event that is not a clock tick.
    async fn next_input(reader: &mut EventReader) -> Option<Event> {
        loop {
            match reader.next().await? {
                Event::Tick | Event::Frame => {}
                other => return Some(other),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_presses_and_repaints_get_through() {
        let input = stream::iter(vec![
            key('a', KeyEventKind::Release),
            Ok(TermEvent::FocusLost),
            key('b', KeyEventKind::Press),
            Ok(TermEvent::Resize(80, 24)),
            Ok(TermEvent::FocusGained),
        ])
        .chain(stream::pending());
        let mut reader = EventReader::from_stream(input, cadence(None), CancellationToken::new());

        let first = next_input(&mut reader).await;
        assert!(matches!(first, Some(Event::Key(k)) if k.code == KeyCode::Char('b')));
        assert!(matches!(next_input(&mut reader).await, Some(Event::Redraw)));
        assert!(matches!(next_input(&mut reader).await, Some(Event::Redraw)));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_fires_once_per_quiet_spell() {
        let mut reader = EventReader::from_stream(
            stream::pending::<io::Result<TermEvent>>(),
            cadence(Some(Duration::from_secs(10))),
            CancellationToken::new(),
        );

        assert!(matches!(next_input(&mut reader).await, Some(Event::Idle)));
        let again = tokio::time::timeout(Duration::from_secs(60), next_input(&mut reader)).await;
        assert!(again.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn keys_push_the_idle_timer_back() {
        let late_key = stream::once(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            key('x', KeyEventKind::Press)
        });
        let input = Box::pin(late_key.chain(stream::pending()));
        let mut reader = EventReader::from_stream(
            input,
            cadence(Some(Duration::from_secs(10))),
            CancellationToken::new(),
        );
        let start = Instant::now();

        assert!(matches!(next_input(&mut reader).await, Some(Event::Key(_))));
        assert!(matches!(next_input(&mut reader).await, Some(Event::Idle)));
        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_reader() {
        let cancel = CancellationToken::new();
        let input = stream::pending::<io::Result<TermEvent>>();
        let mut reader = EventReader::from_stream(input, cadence(None), cancel.clone());
        cancel.cancel();
        while reader.next().await.is_some() {}
    }
}
