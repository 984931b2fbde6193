//! Main-sequence reference table and mass interpolation.

pub(crate) const TABLE_MIN_MASS: f64 = 0.1;
pub(crate) const TABLE_MAX_MASS: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StellarTableRow {
    pub(crate) mass: f64,
    pub(crate) temperature: f64,
    pub(crate) radius: f64,
    pub(crate) luminosity: f64,
    pub(crate) lifetime_gyr: f64,
}

const fn row(
    mass: f64,
    temperature: f64,
    radius: f64,
    luminosity: f64,
    lifetime_gyr: f64,
) -> StellarTableRow {
    StellarTableRow {
        mass,
        temperature,
        radius,
        luminosity,
        lifetime_gyr,
    }
}

// mass (M☉), temperature (K), radius (R☉), luminosity (L☉), lifetime (Gyr)
pub(crate) static STELLAR_TABLE: [StellarTableRow; 20] = [
    row(0.1, 2800.0, 0.16, 0.000008, 10000.0),
    row(0.2, 3200.0, 0.25, 0.00008, 2500.0),
    row(0.3, 3400.0, 0.36, 0.0004, 1100.0),
    row(0.5, 3800.0, 0.54, 0.003, 200.0),
    row(0.7, 4200.0, 0.70, 0.02, 50.0),
    row(0.8, 4600.0, 0.84, 0.04, 20.0),
    row(1.0, 5800.0, 1.00, 1.0, 10.0), // Sun
    row(1.2, 6200.0, 1.15, 2.2, 5.0),
    row(1.5, 6800.0, 1.35, 5.4, 2.5),
    row(2.0, 8200.0, 1.80, 16.0, 1.0),
    row(3.0, 11000.0, 2.50, 60.0, 0.37),
    row(5.0, 17000.0, 3.80, 600.0, 0.1),
    row(8.0, 25000.0, 5.50, 4000.0, 0.03),
    row(10.0, 30000.0, 6.50, 10000.0, 0.02),
    row(15.0, 35000.0, 8.50, 30000.0, 0.01),
    row(20.0, 40000.0, 10.0, 70000.0, 0.007),
    row(25.0, 44000.0, 12.0, 120000.0, 0.005),
    row(30.0, 46000.0, 14.0, 200000.0, 0.004),
    row(40.0, 50000.0, 18.0, 400000.0, 0.003),
    row(50.0, 52000.0, 22.0, 700000.0, 0.002),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StellarProperties {
    pub(crate) temperature: f64,
    pub(crate) radius: f64,
    pub(crate) luminosity: f64,
    pub(crate) lifetime_myr: f64,
}

impl From<&StellarTableRow> for StellarProperties {
    fn from(r: &StellarTableRow) -> Self {
        Self {
            temperature: r.temperature,
            radius: r.radius,
            luminosity: r.luminosity,
            lifetime_myr: r.lifetime_gyr * 1000.0,
        }
    }
}

/// Interpolated main-sequence properties for `mass` (solar masses).
///
/// Masses outside the table are clamped to the nearest edge row. Exact
/// table masses return the row untouched.
pub(crate) fn lookup(mass: f64) -> StellarProperties {
    // NaN fails every comparison below; pin it to the first row.
    let mass = if mass.is_nan() {
        TABLE_MIN_MASS
    } else {
        mass.clamp(TABLE_MIN_MASS, TABLE_MAX_MASS)
    };

    let (lower, upper) = STELLAR_TABLE
        .windows(2)
        .find(|pair| pair[0].mass <= mass && mass <= pair[1].mass)
        .map(|pair| (&pair[0], &pair[1]))
        .unwrap_or((&STELLAR_TABLE[0], &STELLAR_TABLE[1]));

    if lower.mass == mass {
        return lower.into();
    }
    if upper.mass == mass {
        return upper.into();
    }

    let fraction = (mass - lower.mass) / (upper.mass - lower.mass);
    let lerp = |a: f64, b: f64| a + fraction * (b - a);

    StellarProperties {
        temperature: lerp(lower.temperature, upper.temperature),
        radius: lerp(lower.radius, upper.radius),
        luminosity: lerp(lower.luminosity, upper.luminosity),
        lifetime_myr: lerp(lower.lifetime_gyr, upper.lifetime_gyr) * 1000.0,
    }
}

/// Total lifetime in Myr; this is the simulation's `max_age`.
pub(crate) fn lifetime_myr(mass: f64) -> f64 {
    lookup(mass).lifetime_myr
}

/* -----------------------------
   Textbook power laws (display only)
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScalingRelations {
    pub(crate) temperature: f64,
    pub(crate) radius: f64,
    pub(crate) luminosity: f64,
    pub(crate) lifetime_gyr: f64,
}

pub(crate) fn scaling_relations(mass: f64) -> ScalingRelations {
    ScalingRelations {
        temperature: 5800.0 * mass.powf(0.5),
        radius: mass.powf(0.8),
        luminosity: mass.powf(3.5),
        // The lifetime card quotes the interpolated table, not the power law.
        lifetime_gyr: lifetime_myr(mass) / 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn table_is_sorted_and_spans_range() {
        assert!(STELLAR_TABLE.windows(2).all(|p| p[0].mass < p[1].mass));
        assert_eq!(STELLAR_TABLE[0].mass, TABLE_MIN_MASS);
        assert_eq!(STELLAR_TABLE[STELLAR_TABLE.len() - 1].mass, TABLE_MAX_MASS);
    }

    #[test]
    fn exact_rows_are_returned_verbatim() {
        for r in STELLAR_TABLE.iter() {
            let p = lookup(r.mass);
            assert_eq!(p.temperature, r.temperature);
            assert_eq!(p.radius, r.radius);
            assert_eq!(p.luminosity, r.luminosity);
            assert_eq!(p.lifetime_myr, r.lifetime_gyr * 1000.0);
        }
    }

    #[test]
    fn sun_matches_reference_row() {
        let sun = lookup(1.0);
        assert_eq!(sun.temperature, 5800.0);
        assert_eq!(sun.radius, 1.0);
        assert_eq!(sun.luminosity, 1.0);
        assert_eq!(sun.lifetime_myr, 10_000.0);
        assert_eq!(lifetime_myr(1.0), 10_000.0);
    }

    #[test]
    fn midpoint_interpolates_linearly() {
        // halfway between 1.0 and 1.2
        let p = lookup(1.1);
        assert!(close(p.temperature, 6000.0));
        assert!(close(p.radius, 1.075));
        assert!(close(p.luminosity, 1.6));
        assert!(close(p.lifetime_myr, 7500.0));
    }

    #[test]
    fn all_properties_positive_across_range() {
        let mut m = TABLE_MIN_MASS;
        while m <= TABLE_MAX_MASS {
            let p = lookup(m);
            assert!(p.temperature > 0.0, "temperature at {m}");
            assert!(p.radius > 0.0, "radius at {m}");
            assert!(p.luminosity > 0.0, "luminosity at {m}");
            assert!(p.lifetime_myr > 0.0, "lifetime at {m}");
            m += 0.05;
        }
    }

    #[test]
    fn out_of_range_clamps_to_edge_rows() {
        assert_eq!(lookup(0.01), lookup(TABLE_MIN_MASS));
        assert_eq!(lookup(-3.0), lookup(TABLE_MIN_MASS));
        assert_eq!(lookup(120.0), lookup(TABLE_MAX_MASS));
        assert_eq!(lookup(f64::INFINITY), lookup(TABLE_MAX_MASS));
        assert_eq!(lookup(f64::NAN), lookup(TABLE_MIN_MASS));
    }

    #[test]
    fn heavier_stars_live_shorter() {
        assert!(lifetime_myr(0.5) > lifetime_myr(1.0));
        assert!(lifetime_myr(1.0) > lifetime_myr(8.0));
        assert!(lifetime_myr(8.0) > lifetime_myr(50.0));
    }

    #[test]
    fn scaling_relations_for_sun() {
        let s = scaling_relations(1.0);
        assert!(close(s.temperature, 5800.0));
        assert!(close(s.radius, 1.0));
        assert!(close(s.luminosity, 1.0));
        assert!(close(s.lifetime_gyr, 10.0));

        let heavy = scaling_relations(4.0);
        assert!(close(heavy.temperature, 11600.0));
        assert!(close(heavy.luminosity, 128.0));
    }
}
