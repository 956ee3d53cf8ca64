//! The graphics/input host boundary.
//!
//! Rendering and input polling are not implemented here — they are a
//! trait a consumer supplies, with the actual window/event loop left
//! external to this crate. This
//! mirrors how `aicheye-crustty`'s `Interpreter` owns its own terminal/heap
//! state directly (C has no external device it must abstract over);
//! here the device genuinely is external, so it becomes a trait object
//! threaded through the built-in bridge instead.
//!
//! `HeadlessGraphics` is the one implementor this crate ships: a
//! deterministic stub sufficient to run and test scripts that call the
//! graphics built-ins without a real window. Anyone embedding a real
//! windowing/rendering crate supplies their own [`GraphicsHost`].

use crate::env::Env;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// The external collaborator: a window surface plus keyboard/mouse
/// input.
pub trait GraphicsHost {
    fn width(&self) -> i64;
    fn height(&self) -> i64;
    fn mouse_x(&self) -> i64;
    fn mouse_y(&self) -> i64;
    fn mouse_pressed(&self) -> bool;
    fn up_key(&self) -> bool;
    fn down_key(&self) -> bool;
    fn left_key(&self) -> bool;
    fn right_key(&self) -> bool;
    fn background(&mut self, r: i64, g: i64, b: i64);
    fn draw_rect(&mut self, x: i64, y: i64, r: i64, g: i64, b: i64);
    fn draw_ball(&mut self, x: i64, y: i64);
    /// Swaps buffers, drains input events. Returns `false` on a quit
    /// event — callers may use this to terminate the driver loop early,
    /// though only performing the swap/drain is required; stopping on
    /// quit is left to the embedder.
    fn render(&mut self) -> bool;
}

/// A fixed-size, input-never-pressed stub. `background`/`draw_rect`/
/// `draw_ball` are no-ops; `render` always reports "keep going". Used
/// as the default host so `hotlisp` runs headlessly (no GUI dependency
/// at all) and so tests can drive graphics-calling scripts
/// deterministically.
pub struct HeadlessGraphics {
    pub width: i64,
    pub height: i64,
}

impl HeadlessGraphics {
    pub fn new(width: i64, height: i64) -> Self {
        HeadlessGraphics { width, height }
    }
}

impl Default for HeadlessGraphics {
    fn default() -> Self {
        HeadlessGraphics::new(320, 240)
    }
}

impl GraphicsHost for HeadlessGraphics {
    fn width(&self) -> i64 {
        self.width
    }
    fn height(&self) -> i64 {
        self.height
    }
    fn mouse_x(&self) -> i64 {
        0
    }
    fn mouse_y(&self) -> i64 {
        0
    }
    fn mouse_pressed(&self) -> bool {
        false
    }
    fn up_key(&self) -> bool {
        false
    }
    fn down_key(&self) -> bool {
        false
    }
    fn left_key(&self) -> bool {
        false
    }
    fn right_key(&self) -> bool {
        false
    }
    fn background(&mut self, _r: i64, _g: i64, _b: i64) {}
    fn draw_rect(&mut self, _x: i64, _y: i64, _r: i64, _g: i64, _b: i64) {}
    fn draw_ball(&mut self, _x: i64, _y: i64) {}
    fn render(&mut self) -> bool {
        true
    }
}

fn arg_int(args: &[Value], i: usize, name: &str) -> Result<i64, String> {
    args.get(i)
        .and_then(Value::as_int)
        .ok_or_else(|| format!("{} expects an integer argument {}", name, i))
}

/// Installs `width`/`height`/`mousex`/`mousey`/`mouse-pressed?`/
/// `up-key?`/`down-key?`/`left-key?`/`right-key?`/`background`/`draw`/
/// `draw-ball` (and its `draw_ball` alias)/`render` as host-callables
/// closing over a shared `Rc<RefCell<dyn GraphicsHost>>`.
///
/// Registered under their *canonicalized* names (`mouse_pressedq`,
/// `up_keyq`, ...) since that's what symbol lookup actually resolves to
/// — source calls the hyphenated/`?`-suffixed spelling, and
/// `Env::lookup`'s canonicalization fallback bridges the gap (see
/// `env::canonicalize`).
pub fn install_graphics_builtins(env: &Env, host: Rc<RefCell<dyn GraphicsHost>>) {
    let h = host.clone();
    env.define("width", host_fn(move |_| Ok(Value::Int(h.borrow().width()))));
    let h = host.clone();
    env.define("height", host_fn(move |_| Ok(Value::Int(h.borrow().height()))));
    let h = host.clone();
    env.define("mousex", host_fn(move |_| Ok(Value::Int(h.borrow().mouse_x()))));
    let h = host.clone();
    env.define("mousey", host_fn(move |_| Ok(Value::Int(h.borrow().mouse_y()))));
    let h = host.clone();
    env.define("mouse_pressedq", host_fn(move |_| Ok(bool_val(h.borrow().mouse_pressed()))));
    let h = host.clone();
    env.define("up_keyq", host_fn(move |_| Ok(bool_val(h.borrow().up_key()))));
    let h = host.clone();
    env.define("down_keyq", host_fn(move |_| Ok(bool_val(h.borrow().down_key()))));
    let h = host.clone();
    env.define("left_keyq", host_fn(move |_| Ok(bool_val(h.borrow().left_key()))));
    let h = host.clone();
    env.define("right_keyq", host_fn(move |_| Ok(bool_val(h.borrow().right_key()))));

    let h = host.clone();
    env.define(
        "background",
        host_fn(move |args| {
            let r = arg_int(args, 0, "background")?;
            let g = arg_int(args, 1, "background")?;
            let b = arg_int(args, 2, "background")?;
            h.borrow_mut().background(r, g, b);
            Ok(Value::Nil)
        }),
    );
    let h = host.clone();
    env.define(
        "draw",
        host_fn(move |args| {
            let x = arg_int(args, 0, "draw")?;
            let y = arg_int(args, 1, "draw")?;
            let r = arg_int(args, 2, "draw")?;
            let g = arg_int(args, 3, "draw")?;
            let b = arg_int(args, 4, "draw")?;
            h.borrow_mut().draw_rect(x, y, r, g, b);
            Ok(Value::Nil)
        }),
    );
    let h = host.clone();
    let draw_ball = move |args: &[Value]| -> Result<Value, String> {
        let x = arg_int(args, 0, "draw-ball")?;
        let y = arg_int(args, 1, "draw-ball")?;
        h.borrow_mut().draw_ball(x, y);
        Ok(Value::Nil)
    };
    env.define("draw_ball", Value::Host(Rc::new(draw_ball.clone())));
    env.define("draw-ball", Value::Host(Rc::new(draw_ball)));

    let h = host;
    env.define("render", host_fn(move |_| Ok(bool_val(h.borrow_mut().render()))));
}

fn host_fn<F>(f: F) -> Value
where
    F: Fn(&[Value]) -> Result<Value, String> + 'static,
{
    Value::Host(Rc::new(f))
}

fn bool_val(b: bool) -> Value {
    Value::Int(if b { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_defaults() {
        let g = HeadlessGraphics::default();
        assert_eq!(g.width(), 320);
        assert_eq!(g.height(), 240);
        assert!(!g.mouse_pressed());
    }

    #[test]
    fn test_install_graphics_builtins_resolves_canonical_names() {
        let env = Env::new().push_frame();
        let host: Rc<RefCell<dyn GraphicsHost>> = Rc::new(RefCell::new(HeadlessGraphics::default()));
        install_graphics_builtins(&env, host);
        assert!(env.lookup("width").is_some());
        assert!(env.lookup("mouse_pressedq").is_some());
        assert!(env.lookup("draw-ball").is_some());
        assert!(env.lookup("draw_ball").is_some());
    }
}
