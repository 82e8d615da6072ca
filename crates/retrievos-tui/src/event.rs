//! Terminal input merged with the tick and render clocks.
//!
//! Key presses read here come from the terminal itself, which is what makes
//! them trusted export gestures.

use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::warn;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Notice expiry and spinner frames.
    Tick,
    Render,
}

pub struct EventReader {
    input: EventStream,
    tick: Interval,
    render: Interval,
}

fn clock(period: Duration) -> Interval {
    let mut clock = interval(period);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    clock
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        Self {
            input: EventStream::new(),
            tick: clock(tick_rate),
            render: clock(render_rate),
        }
    }

    /// Wait for the next event. `None` once terminal input has closed.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            tokio::select! {
                _ = self.tick.tick() => return Some(Event::Tick),
                _ = self.render.tick() => return Some(Event::Render),
                input = self.input.next() => match input? {
                    Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        return Some(Event::Key(key));
                    }
                    Ok(TermEvent::Resize(w, h)) => return Some(Event::Resize(w, h)),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "terminal input error");
                        return None;
                    }
                },
            }
        }
    }
}
