//! Ground and wall contact for bodies in free flight.
//!
//! Instead of checking whether the body overlaps the ground at the end of a
//! step (which lets fast bodies sink in and loses energy bookkeeping), the
//! trajectory over the step is swept: the exact time of impact under constant
//! gravity is solved for, the body is moved there, the impact is resolved,
//! and the rest of the step continues from the contact point.
//!
//! ```text
//!   ●  t = 0
//!    \
//!     \     ● t = dt (without contact)
//!      \   /
//! ══════╳══════ ground (y = radius for the center)
//!       └─ impact at t_hit, rebound speed = damping · impact speed
//! ```

use crate::types::{constants, BodyState, Contact, Vec2};

use super::StepEvent;

/// Upper bound on impacts resolved within one step.
const MAX_CONTACTS_PER_STEP: usize = 8;

/// Everything a flying body collides with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub radius: f64,
    pub gravity: f64,
    /// Fraction of normal speed kept on impact.
    pub damping: f64,
    /// Walls at `x = 0` and `x = width`, if any.
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Surface {
    Ground,
    Wall,
}

impl Arena {
    fn acceleration(&self) -> Vec2 {
        Vec2::new(0.0, -self.gravity)
    }

    /// Exact constant-acceleration motion over `t`.
    pub fn ballistic(&self, body: &BodyState, t: f64) -> BodyState {
        let a = self.acceleration();
        BodyState {
            position: body.position + body.velocity * t + a * (0.5 * t * t),
            velocity: body.velocity + a * t,
            contact: body.contact,
        }
    }

    /// Time until the body's lowest point reaches the ground, if within `dt`.
    pub fn time_to_ground(&self, body: &BodyState, dt: f64) -> Option<f64> {
        let height = body.position.y - self.radius;
        let vy = body.velocity.y;

        if height <= constants::EPSILON && vy <= 0.0 {
            return Some(0.0);
        }

        // height + vy·t − ½·g·t² = 0, later root
        let t_hit = if self.gravity > 0.0 {
            let disc = vy * vy + 2.0 * self.gravity * height;
            if disc < 0.0 {
                return None;
            }
            (vy + disc.sqrt()) / self.gravity
        } else if vy < 0.0 {
            height / -vy
        } else {
            return None;
        };

        (t_hit >= 0.0 && t_hit <= dt).then_some(t_hit)
    }

    /// Time until the body touches a side wall, if within `dt`.
    pub fn time_to_wall(&self, body: &BodyState, dt: f64) -> Option<f64> {
        let width = self.width?;
        let vx = body.velocity.x;

        let gap = if vx > 0.0 {
            width - self.radius - body.position.x
        } else if vx < 0.0 {
            body.position.x - self.radius
        } else {
            return None;
        };

        let t_hit = (gap / vx.abs()).max(0.0);
        (t_hit <= dt).then_some(t_hit)
    }

    /// Advance a free or resting body by `dt`, resolving every impact on the way.
    pub fn fly(&self, body: &BodyState, dt: f64, events: &mut Vec<StepEvent>) -> BodyState {
        let mut current = *body;
        let mut remaining = dt;

        for _ in 0..MAX_CONTACTS_PER_STEP {
            if current.contact == Contact::Resting {
                return self.slide(&current, remaining, events);
            }

            let hit = match (
                self.time_to_ground(&current, remaining),
                self.time_to_wall(&current, remaining),
            ) {
                (Some(g), Some(w)) if w < g => Some((w, Surface::Wall)),
                (Some(g), _) => Some((g, Surface::Ground)),
                (None, Some(w)) => Some((w, Surface::Wall)),
                (None, None) => None,
            };

            let Some((t_hit, surface)) = hit else {
                return self.ballistic(&current, remaining);
            };

            current = self.ballistic(&current, t_hit);
            remaining -= t_hit;
            current = match surface {
                Surface::Ground => self.bounce_on_ground(&current, remaining, events),
                Surface::Wall => self.bounce_on_wall(&current, events),
            };
        }

        log::trace!("contact budget exhausted, dropping {remaining:.3e}s of flight");
        current
    }

    fn bounce_on_ground(
        &self,
        body: &BodyState,
        remaining: f64,
        events: &mut Vec<StepEvent>,
    ) -> BodyState {
        let impact_speed = (-body.velocity.y).max(0.0);
        let rebound = impact_speed * self.damping;
        let position = Vec2::new(body.position.x, self.radius);

        // A hop shorter than the next step is indistinguishable from rest.
        let rest_speed = 0.5 * self.gravity * remaining.max(constants::DEFAULT_DT);
        if rebound <= rest_speed {
            events.push(StepEvent::CameToRest);
            return BodyState::new(position, Vec2::new(body.velocity.x, 0.0), Contact::Resting);
        }

        events.push(StepEvent::Bounce { impact_speed });
        BodyState::new(
            position,
            Vec2::new(body.velocity.x, rebound),
            Contact::Airborne,
        )
    }

    fn bounce_on_wall(&self, body: &BodyState, events: &mut Vec<StepEvent>) -> BodyState {
        let impact_speed = body.velocity.x.abs();
        events.push(StepEvent::WallHit { impact_speed });

        let mut next = *body;
        if let Some(width) = self.width {
            next.position.x = next.position.x.clamp(self.radius, width - self.radius);
        }
        next.velocity.x = -body.velocity.x * self.damping;
        next
    }

    /// Horizontal motion along the ground, still bouncing off walls.
    fn slide(&self, body: &BodyState, dt: f64, events: &mut Vec<StepEvent>) -> BodyState {
        let mut current = *body;
        let mut remaining = dt;

        for _ in 0..MAX_CONTACTS_PER_STEP {
            match self.time_to_wall(&current, remaining) {
                Some(t_hit) => {
                    current.position.x += current.velocity.x * t_hit;
                    remaining -= t_hit;
                    current = self.bounce_on_wall(&current, events);
                }
                None => {
                    current.position.x += current.velocity.x * remaining;
                    break;
                }
            }
        }
        current
    }
}
