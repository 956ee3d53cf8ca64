//! The built-in demo program, run when `hotlisp` is invoked with no
//! script argument: writing a small sample program to a temp file and
//! running that is friendlier than printing a usage message and exiting.
//!
//! Uses the canonical built-in spelling (`mouse-pressed?`, space-separated
//! call arguments) throughout.

pub const DEMO_SOURCE: &str = r#"
(do
    (fun draw-ob x
        (draw x (height) 200 200 200))
    (fun draw-obs (do
        (draw-ob 20)
        (draw-ob 60)
        (draw-ob 100)
        (draw-ob 180)))
    (fun jump y dy
        (if (< y 1)
            20
            dy))
    (fun step-x x dx
        (+ (if (> x (width)) 0 x) dx))
    (fun step-y y dy
        (+ y dy))
    (fun gravity y dy
        (if (> y 0) (- dy 1) dy))
    (fun ground y
        (if (< y 1) 0 y))
    (fun mainloop x y dx dy
        (do
            (if (mouse-pressed?)
                (set dy (jump y dy)))
            (set x (step-x x dx))
            (set y (step-y y dy))
            (set y (ground y))
            (set dy (gravity y dy))
            (background 100 100 100)
            (draw-obs)
            (draw-ball x (- (height) y))
            (if (render)
                (mainloop x y dx dy)
                0)))
    (mainloop 0 0 1 0))
"#;
