//! Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! Used for the UTM zones the simulation results are stored in. The series
//! follow Krüger's expansion in the third flattening `n`, carried to `n^6`
//! (Karney, "Transverse Mercator with an accuracy of a few nanometers",
//! J. Geodesy 85, 2011), which is accurate to well under a millimeter
//! within a UTM zone.
//!
//! The projection parameters include:
//! - Central meridian (lon0)
//! - Scale factor on the central meridian (k0)
//! - False easting / false northing in meters

/// WGS84 semi-major axis (meters)
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// UTM scale factor on the central meridian
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Number of Krüger series terms.
const ORDER: usize = 6;

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in degrees
    pub lon0: f64,
    /// Scale factor on the central meridian
    pub k0: f64,
    /// False easting (meters)
    pub false_easting: f64,
    /// False northing (meters)
    pub false_northing: f64,
    /// First eccentricity
    e: f64,
    /// Rectifying radius A
    a_rect: f64,
    /// Forward series coefficients alpha_1..alpha_6
    alpha: [f64; ORDER],
    /// Inverse series coefficients beta_1..beta_6
    beta: [f64; ORDER],
}

impl TransverseMercator {
    /// Create a Transverse Mercator projection on the WGS84 ellipsoid.
    ///
    /// # Arguments
    /// * `lon0_deg` - Central meridian (degrees)
    /// * `k0` - Scale factor on the central meridian
    /// * `false_easting` - Added to every easting (meters)
    /// * `false_northing` - Added to every northing (meters)
    pub fn wgs84(lon0_deg: f64, k0: f64, false_easting: f64, false_northing: f64) -> Self {
        let f = WGS84_F;
        let n = f / (2.0 - f);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let a_rect = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0 - 127.0 * n5 / 288.0
                + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0 + 281.0 * n5 / 630.0
                - 1_983_433.0 * n6 / 1_935_360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167_603.0 * n6 / 181_440.0,
            49561.0 * n4 / 161_280.0 - 179.0 * n5 / 168.0 + 6_601_661.0 * n6 / 7_257_600.0,
            34729.0 * n5 / 80640.0 - 3_418_889.0 * n6 / 1_995_840.0,
            212_378_941.0 * n6 / 319_334_400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0 - 81.0 * n5 / 512.0
                + 96199.0 * n6 / 604_800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1_118_711.0 * n6 / 3_870_720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0 + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161_280.0 - 11.0 * n5 / 504.0 - 830_251.0 * n6 / 7_257_600.0,
            4583.0 * n5 / 161_280.0 - 108_847.0 * n6 / 3_991_680.0,
            20_648_693.0 * n6 / 638_668_800.0,
        ];

        Self {
            lon0: lon0_deg,
            k0,
            false_easting,
            false_northing,
            e: (f * (2.0 - f)).sqrt(),
            a_rect,
            alpha,
            beta,
        }
    }

    /// Create the projection for a UTM zone.
    ///
    /// Zone `z` has central meridian `6z - 183` degrees.
    pub fn utm(zone: u8, north: bool) -> Self {
        let lon0 = f64::from(zone) * 6.0 - 183.0;
        let false_northing = if north { 0.0 } else { UTM_FALSE_NORTHING_SOUTH };
        Self::wgs84(lon0, UTM_K0, UTM_FALSE_EASTING, false_northing)
    }

    /// Project geographic coordinates (degrees) to (easting, northing) in meters.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let phi = lat_deg.to_radians();
        let lam = normalize_longitude(lon_deg - self.lon0).to_radians();

        // Conformal latitude, as tan(chi)
        let sin_phi = phi.sin();
        let t = (sin_phi.atanh() - self.e * (self.e * sin_phi).atanh()).sinh();

        let xi_p = t.atan2(lam.cos());
        let eta_p = (lam.sin() / (1.0 + t * t).sqrt()).atanh();

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, alpha) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi += alpha * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += alpha * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let scale = self.k0 * self.a_rect;
        (
            self.false_easting + scale * eta,
            self.false_northing + scale * xi,
        )
    }

    /// Unproject (easting, northing) in meters to geographic (lon, lat) degrees.
    pub fn inverse(&self, easting: f64, northing: f64) -> (f64, f64) {
        let scale = self.k0 * self.a_rect;
        let xi = (northing - self.false_northing) / scale;
        let eta = (easting - self.false_easting) / scale;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, beta) in self.beta.iter().enumerate() {
            let k = 2.0 * (j + 1) as f64;
            xi_p -= beta * (k * xi).sin() * (k * eta).cosh();
            eta_p -= beta * (k * xi).cos() * (k * eta).sinh();
        }

        let lam = eta_p.sinh().atan2(xi_p.cos());
        let tau_p = xi_p.sin() / (eta_p.sinh().powi(2) + xi_p.cos().powi(2)).sqrt();
        let tau = self.tau_from_conformal(tau_p);

        let lon = normalize_longitude(self.lon0 + lam.to_degrees());
        (lon, tau.atan().to_degrees())
    }

    /// Solve tan(phi) from tan(chi) by Newton's method.
    fn tau_from_conformal(&self, tau_p: f64) -> f64 {
        let e = self.e;
        let one_minus_e2 = 1.0 - e * e;

        let mut tau = tau_p;
        for _ in 0..8 {
            let tau1 = (1.0 + tau * tau).sqrt();
            let sig = (e * (e * tau / tau1).atanh()).sinh();
            let tau_pi = tau * (1.0 + sig * sig).sqrt() - sig * tau1;
            let dtau = (tau_p - tau_pi) / (1.0 + tau_pi * tau_pi).sqrt()
                * (1.0 + one_minus_e2 * tau * tau)
                / (one_minus_e2 * tau1);
            tau += dtau;
            if dtau.abs() < 1e-14 * tau.abs().max(1.0) {
                break;
            }
        }
        tau
    }
}

/// Wrap a longitude into [-180, 180).
fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
