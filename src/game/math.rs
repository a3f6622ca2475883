use serde::{
    Deserialize,
    Serialize
};

pub type Vector2F = Vector2X<f32>;
pub type Vector2U = Vector2X<u32>;
pub type Vector2I = Vector2X<i32>;

/// Plain value pair. `Copy` means every assignment is a value copy,
/// so two logical owners can never alias the same coordinates.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vector2X<T> {
    pub x: T,
    pub y: T,
}

pub type Rect2F = Rect2X<f32>;
pub type Rect2U = Rect2X<u32>;
pub type Rect2I = Rect2X<i32>;

/// Axis aligned rectangle, `pos` is the upper-left corner.
/// Negative `size` components are not a supported state.
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Rect2X<T> {
    pub pos: Vector2X<T>,
    pub size: Vector2X<T>,
}

impl<T: std::fmt::Display> std::fmt::Display for Vector2X<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Rect2X<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[({},{}), ({},{})]", self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

impl<T> Vector2X<T>
where
    T: Default
{
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: T::default(), y: T::default() }
    }
}

impl<T> Vector2X<T>
where
    T: Into<f32> + Copy
{
    pub fn length_squared(&self) -> f32 {
        let xf: f32 = T::into(self.x);
        let yf: f32 = T::into(self.y);
        xf.powi(2) + yf.powi(2)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn normal(&self) -> Vector2X<f32> {
        let len = self.length();
        Vector2X {
            x: T::into(self.x) / len,
            y: T::into(self.y) / len,
        }
    }
}

impl<T> Vector2X<T>
where
    T: std::ops::Mul<Output = T> + Copy
{
    /// Component-wise product, used for per-axis scale transforms.
    pub fn scaled(&self, factor: Vector2X<T>) -> Self {
        Self {
            x: self.x * factor.x,
            y: self.y * factor.y,
        }
    }
}

impl<T> std::ops::Add for Vector2X<T>
where
    T: std::ops::Add<Output = T>
{
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y
        }
    }
}

impl<T> std::ops::AddAssign for Vector2X<T>
where
    T: std::ops::AddAssign
{
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl<T> std::ops::Neg for Vector2X<T>
where
    T: std::ops::Neg<Output = T>
{
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self {
            x: T::neg(self.x),
            y: T::neg(self.y),
        }
    }
}

impl<T> std::ops::Mul<T> for Vector2X<T>
where
    T: std::ops::Mul<Output = T> + Copy
{
    type Output = Self;
    fn mul(self, rhs: T) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs
        }
    }
}

impl<T> std::ops::Sub for Vector2X<T>
where
    T: std::ops::Sub<Output = T>
{
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: T::sub(self.x, rhs.x),
            y: T::sub(self.y, rhs.y)
        }
    }
}

impl From<Vector2X<f32>> for Vector2X<u32> {
    fn from(value: Vector2X<f32>) -> Self {
        Self { x: value.x as u32, y: value.y as u32 }
    }
}

impl From<Vector2X<u32>> for Vector2X<f32> {
    fn from(value: Vector2X<u32>) -> Self {
        Self { x: value.x as f32, y: value.y as f32 }
    }
}

impl<T> Rect2X<T> {
    pub fn new(x: T, y: T, w: T, h: T) -> Self {
        Self { pos: Vector2X { x, y }, size: Vector2X { x: w, y: h } }
    }
}

impl<T> Rect2X<T>
where
    T: std::ops::Add<Output = T> + Copy
{
    /// Right edge, `x + width`.
    pub fn x2(&self) -> T {
        self.pos.x + self.size.x
    }

    /// Bottom edge, `y + height`.
    pub fn y2(&self) -> T {
        self.pos.y + self.size.y
    }

    pub fn translated(&self, offset: Vector2X<T>) -> Self {
        Self {
            pos: self.pos + offset,
            size: self.size,
        }
    }
}

impl<T> Rect2X<T>
where
    T: PartialOrd + std::ops::Add<Output = T> + Copy
{
    /// Point test, closed on all four bounds: points lying exactly on an
    /// edge are contained.
    pub fn contains(&self, point: &Vector2X<T>) -> bool {
        point.x >= self.pos.x
            && point.y >= self.pos.y
            && point.x <= self.x2()
            && point.y <= self.y2()
    }

    /// Closed-interval overlap test: rectangles touching only along an
    /// edge or at a corner still count as overlapping. Symmetric.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.pos.x <= other.x2()
            && self.x2() >= other.pos.x
            && self.pos.y <= other.y2()
            && self.y2() >= other.pos.y
    }
}

impl Rect2F {
    pub fn center(&self) -> Vector2F {
        Vector2F::new(
            self.pos.x + self.size.x / 2.0,
            self.pos.y + self.size.y / 2.0,
        )
    }
}

#[test]
fn test_vector_creation() {
    let v1 = Vector2X::<f32>::new(1.0, 2.0);
    assert_eq!(v1.x, 1.0);
    assert_eq!(v1.y, 2.0);
}

#[test]
fn test_vector_add_sub() {
    let v1 = Vector2X::<u32>::new(1, 2);
    let v2 = Vector2X::<u32>::new(10, 20);
    let v3 = v1 + v2;
    assert_eq!(v3.x, 11);
    assert_eq!(v3.y, 22);
    let v4 = v3 - v1;
    assert_eq!(v4, v2);
}

#[test]
fn test_vector_assignment_copies() {
    let v1 = Vector2F::new(1.0, 2.0);
    let mut v2 = v1;
    v2.x = 100.0;
    assert_eq!(v1.x, 1.0, "mutation through one owner leaked into the other");
}

#[test]
fn test_vector_scaled_componentwise() {
    let v = Vector2F::new(2.0, 3.0).scaled(Vector2F::new(10.0, 100.0));
    assert_eq!(v, Vector2F::new(20.0, 300.0));
}

#[test]
fn test_rect_edges() {
    let rect = Rect2F::new(1.0, 2.0, 3.0, 5.0);
    assert_eq!(rect.x2(), 4.0);
    assert_eq!(rect.y2(), 7.0);
    assert_eq!(rect.center(), Vector2F::new(2.5, 4.5));
}

#[test]
fn test_rect_translated_keeps_size() {
    let rect = Rect2F::new(1.0, 2.0, 3.0, 5.0);
    let moved = rect.translated(Vector2F::new(10.0, -2.0));
    assert_eq!(moved.pos, Vector2F::new(11.0, 0.0));
    assert_eq!(moved.size, rect.size);
}

#[test]
fn test_rect_containing_is_closed() {
    let rect = Rect2F::new(1.0, 0.0, 3.0, 5.0);

    // All four corners lie on the boundary and are contained.
    assert!(rect.contains(&Vector2F::new(1.0, 0.0)));
    assert!(rect.contains(&Vector2F::new(4.0, 0.0)));
    assert!(rect.contains(&Vector2F::new(1.0, 5.0)));
    assert!(rect.contains(&Vector2F::new(4.0, 5.0)));
    assert!(rect.contains(&rect.center()));

    assert!(!rect.contains(&Vector2F::new(4.1, 0.0)));
    assert!(!rect.contains(&Vector2F::new(1.0, -0.1)));
}

#[test]
fn test_rect_overlap_basic() {
    let a = Rect2F::new(0.0, 0.0, 2.0, 2.0);
    let b = Rect2F::new(1.0, 1.0, 2.0, 2.0);
    let c = Rect2F::new(10.0, 10.0, 1.0, 1.0);
    assert!(a.overlaps(&b));
    assert!(!a.overlaps(&c));
}

#[test]
fn test_rect_overlap_symmetric() {
    let rects = [
        Rect2F::new(0.0, 0.0, 2.0, 2.0),
        Rect2F::new(1.5, -0.5, 1.0, 1.0),
        Rect2F::new(2.0, 2.0, 4.0, 0.5),
        Rect2F::new(-3.0, 0.0, 1.0, 8.0),
    ];
    for a in &rects {
        for b in &rects {
            assert_eq!(a.overlaps(b), b.overlaps(a), "a={a}, b={b}");
        }
    }
}

#[test]
fn test_rect_overlap_touching_edges_count() {
    let a = Rect2F::new(0.0, 0.0, 1.0, 1.0);
    let edge = Rect2F::new(1.0, 0.0, 1.0, 1.0);
    let corner = Rect2F::new(1.0, 1.0, 1.0, 1.0);
    assert!(a.overlaps(&edge));
    assert!(a.overlaps(&corner));
}

#[test]
fn test_zero_sized_rect_overlaps_as_point() {
    let a = Rect2F::new(0.0, 0.0, 2.0, 2.0);
    let point = Rect2F::new(1.0, 1.0, 0.0, 0.0);
    assert!(a.overlaps(&point));
    assert!(point.overlaps(&a));
}
