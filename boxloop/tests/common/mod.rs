use std::collections::{HashSet, VecDeque};

use anyhow::{bail, Result};
use boxloop::{Color, Key, Platform, PlatformEvent, Rect};

/// A draw or present issued by the loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Call {
    Clear(Color),
    DrawRect(Rect, Color),
    Present,
}

struct FrameScript {
    events: Vec<PlatformEvent>,
    held: Vec<Key>,
}

/// Fake platform fed one scripted frame per `poll_events`.
///
/// Once the script runs out, every poll reports `CloseRequested`.
#[derive(Default)]
pub struct ScriptedPlatform {
    frames: VecDeque<FrameScript>,
    held: HashSet<Key>,
    pub calls: Vec<Call>,
    pub polls: usize,
    pub fail_present: bool,
}

impl ScriptedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` frames with exactly `keys` held.
    pub fn hold(mut self, keys: &[Key], count: usize) -> Self {
        for _ in 0..count {
            self.frames.push_back(FrameScript {
                events: Vec::new(),
                held: keys.to_vec(),
            });
        }
        self
    }

    /// `count` frames with no keys held.
    pub fn idle(self, count: usize) -> Self {
        self.hold(&[], count)
    }

    /// One frame delivering `events` while `keys` are held.
    pub fn frame(mut self, events: &[PlatformEvent], keys: &[Key]) -> Self {
        self.frames.push_back(FrameScript {
            events: events.to_vec(),
            held: keys.to_vec(),
        });
        self
    }

    pub fn close(self) -> Self {
        self.frame(&[PlatformEvent::CloseRequested], &[])
    }

    pub fn presents(&self) -> usize {
        self.calls.iter().filter(|call| **call == Call::Present).count()
    }

    /// Every rect drawn, in order.
    pub fn rects(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::DrawRect(rect, _) => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl Platform for ScriptedPlatform {
    fn poll_events(&mut self) -> Result<Vec<PlatformEvent>> {
        self.polls += 1;
        match self.frames.pop_front() {
            Some(script) => {
                self.held = script.held.into_iter().collect();
                Ok(script.events)
            }
            None => Ok(vec![PlatformEvent::CloseRequested]),
        }
    }

    fn key_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.calls.push(Call::Clear(color));
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.calls.push(Call::DrawRect(rect, color));
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        if self.fail_present {
            bail!("surface lost for good");
        }
        self.calls.push(Call::Present);
        Ok(())
    }
}
