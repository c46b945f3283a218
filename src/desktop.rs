//! Desktop queries: work areas and other top-level windows
//!
//! Snapping needs the usable screen area and the bounds of the other
//! visible windows. On X11 both come from EWMH root-window properties;
//! elsewhere the render layer's monitor size is used via [`StaticDesktop`].

use anyhow::{Context, Result};
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::types::Rect;

/// Work areas and foreign window bounds, in the same units as the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesktopSnapshot {
    pub work_areas: Vec<Rect>,
    pub windows: Vec<Rect>,
}

impl DesktopSnapshot {
    /// Convert physical pixels to logical points
    pub fn scaled(self, pixels_per_point: f32) -> Self {
        if !pixels_per_point.is_finite() || pixels_per_point <= 0.0 || pixels_per_point == 1.0 {
            return self;
        }
        let scale = |r: Rect| {
            let s = f64::from(pixels_per_point);
            let left = (f64::from(r.left()) / s).round() as i32;
            let top = (f64::from(r.top()) / s).round() as i32;
            let right = (f64::from(r.right()) / s).round() as i32;
            let bottom = (f64::from(r.bottom()) / s).round() as i32;
            Rect::from_edges(left, top, right, bottom)
        };
        Self {
            work_areas: self.work_areas.into_iter().map(scale).collect(),
            windows: self.windows.into_iter().map(scale).collect(),
        }
    }
}

pub trait Desktop {
    fn snapshot(&self) -> Result<DesktopSnapshot>;
}

/// Fixed answer, used when no window system query is available
#[derive(Debug, Clone, Default)]
pub struct StaticDesktop {
    snapshot: DesktopSnapshot,
}

impl StaticDesktop {
    pub fn new(work_areas: Vec<Rect>) -> Self {
        Self {
            snapshot: DesktopSnapshot {
                work_areas,
                windows: Vec::new(),
            },
        }
    }
}

impl Desktop for StaticDesktop {
    fn snapshot(&self) -> Result<DesktopSnapshot> {
        Ok(self.snapshot.clone())
    }
}

/// Pre-cached X11 atoms to avoid repeated roundtrips
struct CachedAtoms {
    net_client_list: Atom,
    net_workarea: Atom,
    net_current_desktop: Atom,
    net_wm_pid: Atom,
    net_wm_state: Atom,
    net_wm_state_hidden: Atom,
}

impl CachedAtoms {
    fn new(conn: &RustConnection) -> Result<Self> {
        let intern = |name: &[u8]| -> Result<Atom> {
            let label = String::from_utf8_lossy(name);
            Ok(conn
                .intern_atom(false, name)
                .context(format!("Failed to intern {} atom", label))?
                .reply()
                .context(format!("Failed to get reply for {} atom", label))?
                .atom)
        };
        Ok(Self {
            net_client_list: intern(b"_NET_CLIENT_LIST")?,
            net_workarea: intern(b"_NET_WORKAREA")?,
            net_current_desktop: intern(b"_NET_CURRENT_DESKTOP")?,
            net_wm_pid: intern(b"_NET_WM_PID")?,
            net_wm_state: intern(b"_NET_WM_STATE")?,
            net_wm_state_hidden: intern(b"_NET_WM_STATE_HIDDEN")?,
        })
    }
}

pub struct X11Desktop {
    conn: RustConnection,
    root: Window,
    atoms: CachedAtoms,
    own_pid: u32,
}

impl X11Desktop {
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)
            .context("Failed to connect to X11 server")?;
        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .context(format!("Invalid screen number {}", screen_num))?
            .root;
        let atoms = CachedAtoms::new(&conn).context("Failed to cache X11 atoms")?;
        info!(screen = screen_num, "Connected to X11 for desktop queries");
        Ok(Self {
            conn,
            root,
            atoms,
            own_pid: std::process::id(),
        })
    }

    fn cardinal_list(
        &self,
        window: Window,
        property: Atom,
        atom_type: AtomEnum,
    ) -> Result<Vec<u32>> {
        let reply = self
            .conn
            .get_property(false, window, property, atom_type, 0, u32::MAX)
            .context(format!("Failed to query property {} on window {}", property, window))?
            .reply()
            .context(format!("Failed to get property {} reply for window {}", property, window))?;
        Ok(reply.value32().map(|values| values.collect()).unwrap_or_default())
    }

    fn work_area(&self) -> Result<Option<Rect>> {
        let desktop = self
            .cardinal_list(self.root, self.atoms.net_current_desktop, AtomEnum::CARDINAL)?
            .first()
            .copied()
            .unwrap_or(0) as usize;
        let values = self.cardinal_list(self.root, self.atoms.net_workarea, AtomEnum::CARDINAL)?;
        let area = values
            .chunks_exact(4)
            .nth(desktop)
            .or_else(|| values.chunks_exact(4).next())
            .map(|v| Rect::new(v[0] as i32, v[1] as i32, v[2] as i32, v[3] as i32));
        Ok(area)
    }

    fn is_candidate(&self, window: Window) -> Result<bool> {
        let pid = self.cardinal_list(window, self.atoms.net_wm_pid, AtomEnum::CARDINAL)?;
        if pid.first() == Some(&self.own_pid) {
            return Ok(false);
        }
        let state = self.cardinal_list(window, self.atoms.net_wm_state, AtomEnum::ATOM)?;
        Ok(!state.contains(&self.atoms.net_wm_state_hidden))
    }

    fn window_rect(&self, window: Window) -> Result<Rect> {
        let geom = self
            .conn
            .get_geometry(window)
            .context(format!("Failed to query geometry for window {}", window))?
            .reply()
            .context(format!("Failed to get geometry reply for window {}", window))?;
        let origin = self
            .conn
            .translate_coordinates(window, self.root, 0, 0)
            .context(format!("Failed to translate coordinates for window {}", window))?
            .reply()
            .context(format!("Failed to get translate reply for window {}", window))?;
        Ok(Rect::new(
            i32::from(origin.dst_x),
            i32::from(origin.dst_y),
            i32::from(geom.width),
            i32::from(geom.height),
        ))
    }
}

impl Desktop for X11Desktop {
    fn snapshot(&self) -> Result<DesktopSnapshot> {
        let work_areas = self.work_area()?.into_iter().collect();

        let clients = self.cardinal_list(self.root, self.atoms.net_client_list, AtomEnum::WINDOW)?;
        let mut windows = Vec::with_capacity(clients.len());
        for window in clients {
            // Windows can vanish between the list query and these requests
            match self.is_candidate(window) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!(window, error = %e, "Skipping window");
                    continue;
                }
            }
            match self.window_rect(window) {
                Ok(rect) if !rect.is_empty() => windows.push(rect),
                Ok(_) => {}
                Err(e) => debug!(window, error = %e, "Skipping window"),
            }
        }

        debug!(work_areas = ?work_areas, windows = windows.len(), "Desktop snapshot");
        Ok(DesktopSnapshot {
            work_areas,
            windows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_desktop() {
        let desktop = StaticDesktop::new(vec![Rect::new(0, 0, 1920, 1040)]);
        let snapshot = desktop.snapshot().unwrap();
        assert_eq!(snapshot.work_areas, vec![Rect::new(0, 0, 1920, 1040)]);
        assert!(snapshot.windows.is_empty());
    }

    #[test]
    fn test_scaled_to_points() {
        let snapshot = DesktopSnapshot {
            work_areas: vec![Rect::new(0, 0, 3840, 2080)],
            windows: vec![Rect::new(101, 200, 801, 600)],
        };
        let scaled = snapshot.scaled(2.0);
        assert_eq!(scaled.work_areas, vec![Rect::new(0, 0, 1920, 1040)]);
        assert_eq!(scaled.windows, vec![Rect::from_edges(51, 100, 451, 400)]);
    }

    #[test]
    fn test_unit_scale_is_identity() {
        let snapshot = DesktopSnapshot {
            work_areas: vec![Rect::new(10, 20, 30, 40)],
            windows: vec![],
        };
        assert_eq!(snapshot.clone().scaled(1.0), snapshot);
        assert_eq!(snapshot.clone().scaled(f32::NAN), snapshot);
    }
}
