/// WEIRD Project
/// `File` viewer/timer.rs
/// `Description` Frame timer module
/// `Author` TioT2
/// `Last changed` 16.10.2026

use std::time::Instant;

/// Longest frame simulated at once, seconds
const MAX_DELTA_TIME: f32 = 0.1;

/// Timer representation structure
pub struct Timer {
    time_point: Instant,
    fps_time_point: Instant,
    delta_time: f32,
    fps: f32,
    fps_counter: u32,
    fps_duration: f32,
} // struct Timer

impl Timer {
    /// Timer constructor.
    /// * Returns newly created timer with count, starting from creation moment
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            time_point: now,
            fps_time_point: now,
            delta_time: 0.01,
            fps: 30.0,
            fps_counter: 0,
            fps_duration: 1.0,
        }
    } // fn new

    /// Timer duration update function.
    /// * Returns true if FPS value was updated
    pub fn response(&mut self) -> bool {
        let now = Instant::now();

        self.delta_time = (now - self.time_point).as_secs_f32().min(MAX_DELTA_TIME);
        self.time_point = now;
        self.fps_counter += 1;

        let fps_duration = (now - self.fps_time_point).as_secs_f32();
        if fps_duration >= self.fps_duration {
            self.fps = self.fps_counter as f32 / fps_duration;
            self.fps_time_point = now;
            self.fps_counter = 0;
            return true;
        }

        false
    } // fn response

    /// Time between neighbour updates getting function
    /// * Returns delta time
    pub fn get_delta_time(&self) -> f32 {
        self.delta_time
    } // fn get_delta_time

    /// FPS getting function
    /// * Returns FPS
    pub fn get_fps(&self) -> f32 {
        self.fps
    } // fn get_fps
} // impl Timer

// file viewer/timer.rs
