use std::ops::{Add, Mul, Sub};

#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Vec3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Vec3<T> {
    #[inline]
    pub fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Copy + Mul<Output = T>> Vec3<T> {
    #[inline]
    pub fn scale(&self, factor: T) -> Vec3<T> {
        Vec3 {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }
}

impl<T: Copy + Add<Output = T> + Mul<Output = T>> Vec3<T> {
    #[inline]
    pub fn dot(&self, other: &Vec3<T>) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl<T: Copy + Sub<Output = T> + Mul<Output = T>> Vec3<T> {
    #[inline]
    pub fn cross(&self, other: &Vec3<T>) -> Vec3<T> {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }
}

impl Vec3<f64> {
    #[inline]
    pub fn len(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn unit(&self) -> Vec3<f64> {
        let len = self.len();

        Vec3 {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    /// Like `unit`, but a zero-length vector is divided by 1.0 and comes back
    /// unchanged (i.e. still zero).
    #[inline]
    pub fn unit_or_zero(&self) -> Vec3<f64> {
        let len = self.len();
        let len = if len == 0.0 { 1.0 } else { len };

        Vec3 {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn to_f32(&self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

impl From<[f32; 3]> for Vec3<f64> {
    #[inline]
    fn from(v: [f32; 3]) -> Self {
        Vec3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))
    }
}

impl<T: Add<Output = T>> Add for Vec3<T> {
    type Output = Vec3<T>;

    #[inline]
    fn add(self, other: Vec3<T>) -> Self::Output {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<T: Sub<Output = T>> Sub for Vec3<T> {
    type Output = Vec3<T>;

    #[inline]
    fn sub(self, other: Vec3<T>) -> Self::Output {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

#[test]
fn cross_follows_right_hand_rule() {
    let x = Vec3::new(1.0, 0.0, 0.0);
    let y = Vec3::new(0.0, 1.0, 0.0);

    assert_eq!(Vec3::new(0.0, 0.0, 1.0), x.cross(&y));
    assert_eq!(Vec3::new(0.0, 0.0, -1.0), y.cross(&x));
}

#[test]
fn unit_or_zero_keeps_zero_vector() {
    let zero = Vec3::new(0.0, 0.0, 0.0);
    assert_eq!(zero, zero.unit_or_zero());

    let v = Vec3::new(3.0, 0.0, 4.0).unit_or_zero();
    assert!((v.len() - 1.0).abs() < 1e-12);
}
