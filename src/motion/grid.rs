//! A* pathfinding on a 2D walkability grid
//!
//! Small navigation backend implementing [`PathFinder`]. Heights are not
//! modelled here; waypoints carry the anchor's z and are snapped to the
//! ground by the terrain corrector afterwards.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::TAU;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use rand::{Rng, RngCore};
use rustc_hash::FxHashMap;

use super::path::{PathFinder, PathType};

/// A 2D navigation grid over the x/y plane
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// Walkable cells (true = walkable)
    cells: Vec<bool>,
    /// World origin offset
    pub origin: Vec2,
}

impl Grid {
    /// Create a new grid (all cells walkable by default)
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            cells: vec![true; width * height],
            origin: Vec2::ZERO,
        }
    }

    /// Move the grid so its corner sits at `origin`
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Set a cell's walkability
    pub fn set_walkable(&mut self, x: usize, y: usize, walkable: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = walkable;
        }
    }

    /// Check if a cell is walkable
    #[must_use]
    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y * self.width + x]
    }

    /// Convert world position to grid cell, if inside the grid
    #[must_use]
    pub fn world_to_cell(&self, pos: Vec2) -> Option<(usize, usize)> {
        let local = (pos - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (x, y) = (local.x.floor() as usize, local.y.floor() as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Convert grid coordinates to world position (center of cell)
    #[must_use]
    pub fn cell_to_world(&self, x: usize, y: usize) -> Vec2 {
        self.origin
            + Vec2::new(
                (x as f32 + 0.5) * self.cell_size,
                (y as f32 + 0.5) * self.cell_size,
            )
    }

    /// Walkable 4-directional neighbours of a cell
    fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let left = x.checked_sub(1).map(|nx| (nx, y));
        let right = Some((x + 1, y));
        let down = y.checked_sub(1).map(|ny| (x, ny));
        let up = Some((x, y + 1));

        [left, right, down, up]
            .into_iter()
            .flatten()
            .filter(|&(nx, ny)| self.is_walkable(nx, ny))
    }

    /// Find a cell path with A*, start and goal included
    #[must_use]
    pub fn find_cells(&self, start: (usize, usize), goal: (usize, usize)) -> Option<Vec<(usize, usize)>> {
        if !self.is_walkable(start.0, start.1) || !self.is_walkable(goal.0, goal.1) {
            return None;
        }

        let heuristic = |(x, y): (usize, usize)| -> f32 {
            let dx = (x as f32 - goal.0 as f32).abs();
            let dy = (y as f32 - goal.1 as f32).abs();
            dx + dy // Manhattan distance
        };

        let mut open_set = BinaryHeap::new();
        let mut came_from: FxHashMap<(usize, usize), (usize, usize)> = FxHashMap::default();
        let mut g_score: FxHashMap<(usize, usize), f32> = FxHashMap::default();

        g_score.insert(start, 0.0);
        open_set.push(Node {
            cell: start,
            f_cost: heuristic(start),
        });

        while let Some(current) = open_set.pop() {
            if current.cell == goal {
                let mut path = vec![goal];
                let mut curr = goal;
                while let Some(&prev) = came_from.get(&curr) {
                    path.push(prev);
                    curr = prev;
                }
                path.reverse();
                return Some(path);
            }

            let current_g = g_score.get(&current.cell).copied().unwrap_or(f32::MAX);
            for next in self.neighbors(current.cell.0, current.cell.1) {
                let tentative_g = current_g + 1.0;

                if tentative_g < g_score.get(&next).copied().unwrap_or(f32::MAX) {
                    came_from.insert(next, current.cell);
                    g_score.insert(next, tentative_g);
                    open_set.push(Node {
                        cell: next,
                        f_cost: tentative_g + heuristic(next),
                    });
                }
            }
        }

        None
    }
}

/// A* node for priority queue
#[derive(Debug, Clone)]
struct Node {
    cell: (usize, usize),
    f_cost: f32, // g_cost + heuristic
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Grid-backed pathfinder, one per unit.
#[derive(Debug, Clone)]
pub struct GridPathFinder {
    grid: Rc<Grid>,
    length_limit: f32,
    path: Vec<Vec3>,
    path_type: PathType,
}

impl GridPathFinder {
    /// Create a pathfinder over a shared grid
    #[must_use]
    pub fn new(grid: Rc<Grid>) -> Self {
        Self {
            grid,
            length_limit: 0.0,
            path: Vec::new(),
            path_type: PathType::NOPATH,
        }
    }

    fn fail(&mut self) {
        self.path.clear();
        self.path_type = PathType::NOPATH;
    }
}

impl PathFinder for GridPathFinder {
    fn set_path_length_limit(&mut self, limit: f32) {
        self.length_limit = limit.max(0.0);
    }

    fn compute_path_to_random_point(
        &mut self,
        start: Vec3,
        center: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    ) {
        let angle = rng.gen_range(0.0..TAU);
        let distance = radius.max(0.0) * rng.gen_range(0.0f32..=1.0).sqrt();
        let target = center.truncate() + Vec2::from_angle(angle) * distance;

        let (Some(from), Some(to)) = (
            self.grid.world_to_cell(start.truncate()),
            self.grid.world_to_cell(target),
        ) else {
            self.fail();
            return;
        };

        let Some(cells) = self.grid.find_cells(from, to) else {
            self.fail();
            return;
        };

        let z = center.z;
        let last = cells.len() - 1;
        let mut points: Vec<Vec3> = cells
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| match i {
                0 => start,
                i if i == last => target.extend(z),
                _ => self.grid.cell_to_world(x, y).extend(z),
            })
            .collect();
        if points.len() == 1 {
            points.push(target.extend(z));
        }

        self.path_type = PathType::NORMAL;
        if self.length_limit > 0.0 && truncate_to_length(&mut points, self.length_limit) {
            self.path_type |= PathType::SHORT | PathType::INCOMPLETE;
        }
        self.path = points;
    }

    fn path(&self) -> &[Vec3] {
        &self.path
    }

    fn path_type(&self) -> PathType {
        self.path_type
    }
}

/// Cut a polyline at `limit` along its length. Returns true if cut.
fn truncate_to_length(points: &mut Vec<Vec3>, limit: f32) -> bool {
    let mut travelled = 0.0;
    for i in 1..points.len() {
        let segment = points[i].distance(points[i - 1]);
        if travelled + segment > limit {
            let t = (limit - travelled) / segment;
            points[i] = points[i - 1].lerp(points[i], t);
            points.truncate(i + 1);
            return true;
        }
        travelled += segment;
    }
    false
}
