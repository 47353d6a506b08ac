/// WEIRD Project
/// `File` viewer/camera.rs
/// `Description` Viewer camera
/// `Author` TioT2
/// `Last changed` 16.10.2026

use weird_map::math::*;

#[derive(Copy, Clone, Debug)]
pub struct Camera {
    pub location: Vec2,
    /// Eye height, absolute
    pub height: f32,
    pub rotation: f32,
    pub direction: Vec2,
    pub right: Vec2,
} // struct Camera

impl Camera {
    pub fn new() -> Self {
        Self {
            location: Vec2::ZERO,
            height: 0.5,
            rotation: 0.0,
            direction: Vec2::X,
            right: Vec2::NEG_Y,
        }
    }

    pub fn set_location(&mut self, location: Vec2, height: f32, rotation: f32) {
        self.location = location;
        self.rotation = wrap_angle(rotation);
        self.height = height;

        self.direction = Vec2::from_angle(self.rotation);
        self.right = Vec2::new(self.direction.y, -self.direction.x);
    } // fn set_location

    /// Same camera, expressed in other frame
    /// * `transform` - current frame to other frame transform
    pub fn transformed(&self, transform: &Affine2) -> Camera {
        let mut camera = *self;
        camera.set_location(
            transform.transform_point2(self.location),
            self.height,
            self.rotation + affine2_angle(transform),
        );
        camera
    } // fn transformed

    /// Point to camera space (x to the right, y forward) transformation function
    pub fn to_space(&self, p: Vec2) -> Vec2 {
        let delta = p - self.location;

        Vec2::new(delta.dot(self.right), delta.dot(self.direction))
    } // fn to_space

    /// Direction to camera space transformation function
    pub fn direction_to_space(&self, d: Vec2) -> Vec2 {
        Vec2::new(d.dot(self.right), d.dot(self.direction))
    } // fn direction_to_space

    pub fn position(&self) -> Vec3 {
        self.location.extend(self.height)
    }

    pub fn view_direction(&self) -> Vec3 {
        self.direction.extend(0.0)
    }
} // impl Camera

// file viewer/camera.rs
