//! Evolutionary phases: which ones a star visits, which one it is in at a
//! given age, and how each phase reshapes the star's observable properties.

use crate::table::StellarProperties;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Phase {
    MainSequence,
    RedGiant,
    HeliumBurning,
    AsymptoticGiant,
    PlanetaryNebula,
    WhiteDwarf,
    Supernova,
    NeutronStar,
    BlackHole,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PhaseInfo {
    pub(crate) title: &'static str,
    pub(crate) description: &'static str,
    /// Rough share of the stellar lifetime. Informational; the phase clock
    /// slices time uniformly.
    pub(crate) duration: f64,
}

impl Phase {
    pub(crate) fn info(self) -> PhaseInfo {
        match self {
            Phase::MainSequence => PhaseInfo {
                title: "Main Sequence Star",
                description: "Hydrogen is fusing into helium in the core, providing the energy that makes the star shine. The star is in hydrostatic equilibrium: gravity pulling inward is balanced by radiation pressure pushing outward.",
                duration: 0.9,
            },
            Phase::RedGiant => PhaseInfo {
                title: "Red Giant Phase",
                description: "Hydrogen in the core is exhausted. The core contracts and heats up while the outer layers expand dramatically. Hydrogen shell burning occurs around the inert helium core.",
                duration: 0.08,
            },
            Phase::HeliumBurning => PhaseInfo {
                title: "Helium Burning Phase",
                description: "The core temperature reaches 100 million K, igniting helium fusion (triple-alpha process). Carbon and oxygen are produced in the core.",
                duration: 0.02,
            },
            Phase::AsymptoticGiant => PhaseInfo {
                title: "Asymptotic Giant Branch",
                description: "Alternating hydrogen and helium shell burning creates thermal pulses. Strong stellar winds begin to eject the outer layers.",
                duration: 0.01,
            },
            Phase::PlanetaryNebula => PhaseInfo {
                title: "Planetary Nebula",
                description: "The outer layers are ejected, creating a glowing nebula. The hot core is exposed as a white dwarf precursor.",
                duration: 0.001,
            },
            Phase::WhiteDwarf => PhaseInfo {
                title: "White Dwarf",
                description: "A hot, dense stellar remnant supported by electron degeneracy pressure. No fusion occurs; it slowly cools over billions of years.",
                duration: 0.0,
            },
            Phase::Supernova => PhaseInfo {
                title: "Supernova Explosion",
                description: "Core collapse occurs when iron builds up. The explosive death creates and disperses heavy elements throughout the galaxy.",
                duration: 0.001,
            },
            Phase::NeutronStar => PhaseInfo {
                title: "Neutron Star",
                description: "An incredibly dense remnant where protons and electrons are crushed together. A teaspoon would weigh as much as a mountain!",
                duration: 0.0,
            },
            Phase::BlackHole => PhaseInfo {
                title: "Black Hole",
                description: "Gravitational collapse has created a region where spacetime is so curved that nothing, not even light, can escape.",
                duration: 0.0,
            },
        }
    }

    pub(crate) fn slug(self) -> &'static str {
        match self {
            Phase::MainSequence => "main-sequence",
            Phase::RedGiant => "red-giant",
            Phase::HeliumBurning => "helium-burning",
            Phase::AsymptoticGiant => "asymptotic-giant",
            Phase::PlanetaryNebula => "planetary-nebula",
            Phase::WhiteDwarf => "white-dwarf",
            Phase::Supernova => "supernova",
            Phase::NeutronStar => "neutron-star",
            Phase::BlackHole => "black-hole",
        }
    }

    /// Core fusion is visibly underway.
    pub(crate) fn is_fusing(self) -> bool {
        matches!(self, Phase::MainSequence | Phase::HeliumBurning)
    }

    /// Outer layers are streaming away from the star.
    pub(crate) fn sheds_material(self) -> bool {
        matches!(
            self,
            Phase::AsymptoticGiant | Phase::PlanetaryNebula | Phase::Supernova
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().title)
    }
}

/* -----------------------------
   Sequencer
------------------------------ */

const LOW_MASS_PATH: &[Phase] = &[Phase::MainSequence, Phase::WhiteDwarf];

const INTERMEDIATE_MASS_PATH: &[Phase] = &[
    Phase::MainSequence,
    Phase::RedGiant,
    Phase::HeliumBurning,
    Phase::AsymptoticGiant,
    Phase::PlanetaryNebula,
    Phase::WhiteDwarf,
];

const NEUTRON_STAR_PATH: &[Phase] = &[
    Phase::MainSequence,
    Phase::RedGiant,
    Phase::HeliumBurning,
    Phase::Supernova,
    Phase::NeutronStar,
];

const BLACK_HOLE_PATH: &[Phase] = &[
    Phase::MainSequence,
    Phase::RedGiant,
    Phase::HeliumBurning,
    Phase::Supernova,
    Phase::BlackHole,
];

/// Ordered phases a star of initial `mass` passes through.
pub(crate) fn sequence(mass: f64) -> &'static [Phase] {
    if mass < 0.8 {
        LOW_MASS_PATH
    } else if mass < 8.0 {
        INTERMEDIATE_MASS_PATH
    } else if mass < 20.0 {
        NEUTRON_STAR_PATH
    } else {
        BLACK_HOLE_PATH
    }
}

/* -----------------------------
   Phase clock
------------------------------ */

// Absorbs float drift from summing tick increments so a boundary reached
// exactly in wall time is not reported one slice early.
const SLICE_EPSILON: f64 = 1e-9;

/// Index into `sequence(mass)` for the given age. Each phase gets an equal
/// `1/N` share of `max_age`.
pub(crate) fn phase_index(age: f64, max_age: f64, mass: f64) -> usize {
    let len = sequence(mass).len();
    if !(max_age > 0.0) || !(age > 0.0) {
        return 0;
    }
    let progress = age / max_age;
    let slot = (progress * len as f64 + SLICE_EPSILON).floor();
    (slot as usize).min(len - 1)
}

pub(crate) fn current_phase(age: f64, max_age: f64, mass: f64) -> Phase {
    sequence(mass)[phase_index(age, max_age, mass)]
}

/* -----------------------------
   Property adjustment
------------------------------ */

/// Observable properties for `phase`, derived from main-sequence `base`.
pub(crate) fn adjust(phase: Phase, base: StellarProperties) -> StellarProperties {
    match phase {
        Phase::RedGiant => StellarProperties {
            radius: base.radius * 10.0,
            temperature: base.temperature * 0.7,
            ..base
        },
        Phase::WhiteDwarf => StellarProperties {
            radius: 0.01,
            temperature: 50_000.0,
            luminosity: 0.001,
            ..base
        },
        Phase::NeutronStar => StellarProperties {
            radius: 0.00001,
            temperature: 1_000_000.0,
            luminosity: 0.0001,
            ..base
        },
        Phase::BlackHole => StellarProperties {
            radius: 0.000001,
            temperature: 0.0,
            luminosity: 0.0,
            ..base
        },
        Phase::MainSequence
        | Phase::HeliumBurning
        | Phase::AsymptoticGiant
        | Phase::PlanetaryNebula
        | Phase::Supernova => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::lookup;

    const MASSES: [f64; 12] = [0.1, 0.5, 0.79, 0.8, 1.0, 2.5, 7.99, 8.0, 12.0, 19.5, 20.0, 50.0];

    #[test]
    fn sequence_bands() {
        assert_eq!(sequence(0.5).len(), 2);
        assert_eq!(sequence(0.79).len(), 2);
        assert_eq!(sequence(0.8).len(), 6);
        assert_eq!(sequence(7.99).len(), 6);
        assert_eq!(sequence(8.0).len(), 5);
        assert_eq!(sequence(19.99).len(), 5);
        assert_eq!(sequence(20.0).len(), 5);
        assert_eq!(sequence(50.0).len(), 5);
    }

    #[test]
    fn terminal_phase_by_mass() {
        for &m in MASSES.iter() {
            let last = *sequence(m).last().unwrap();
            let expected = if m >= 20.0 {
                Phase::BlackHole
            } else if m >= 8.0 {
                Phase::NeutronStar
            } else {
                Phase::WhiteDwarf
            };
            assert_eq!(last, expected, "mass {m}");
        }
    }

    #[test]
    fn every_sequence_starts_on_main_sequence() {
        for &m in MASSES.iter() {
            assert_eq!(sequence(m)[0], Phase::MainSequence);
        }
    }

    #[test]
    fn age_zero_is_first_and_max_age_is_last() {
        for &m in MASSES.iter() {
            let max_age = lookup(m).lifetime_myr;
            let seq = sequence(m);
            assert_eq!(current_phase(0.0, max_age, m), seq[0]);
            assert_eq!(current_phase(max_age, max_age, m), *seq.last().unwrap());
            assert_eq!(current_phase(max_age * 3.0, max_age, m), *seq.last().unwrap());
        }
    }

    #[test]
    fn slices_are_uniform() {
        // Sun-like: six phases over 10 000 Myr
        let max_age = 10_000.0;
        assert_eq!(current_phase(1_666.0, max_age, 1.0), Phase::MainSequence);
        assert_eq!(current_phase(1_667.0, max_age, 1.0), Phase::RedGiant);
        assert_eq!(current_phase(5_000.0, max_age, 1.0), Phase::AsymptoticGiant);
        assert_eq!(current_phase(9_999.0, max_age, 1.0), Phase::WhiteDwarf);
    }

    #[test]
    fn phase_never_moves_backwards() {
        for &m in MASSES.iter() {
            let max_age = lookup(m).lifetime_myr;
            let mut last = 0;
            for step in 0..=1000 {
                let age = max_age * step as f64 / 1000.0;
                let idx = phase_index(age, max_age, m);
                assert!(idx >= last, "mass {m} step {step}");
                last = idx;
            }
        }
    }

    #[test]
    fn degenerate_max_age_stays_at_start() {
        assert_eq!(current_phase(5.0, 0.0, 1.0), Phase::MainSequence);
        assert_eq!(current_phase(5.0, -10.0, 25.0), Phase::MainSequence);
        assert_eq!(current_phase(5.0, f64::NAN, 1.0), Phase::MainSequence);
    }

    #[test]
    fn white_dwarf_ignores_base() {
        for &m in MASSES.iter() {
            let p = adjust(Phase::WhiteDwarf, lookup(m));
            assert_eq!(p.radius, 0.01);
            assert_eq!(p.temperature, 50_000.0);
            assert_eq!(p.luminosity, 0.001);
        }
    }

    #[test]
    fn red_giant_inflates_and_cools() {
        let base = lookup(1.0);
        let p = adjust(Phase::RedGiant, base);
        assert_eq!(p.radius, 10.0);
        assert!((p.temperature - 4060.0).abs() < 1e-9);
        assert_eq!(p.luminosity, base.luminosity);
    }

    #[test]
    fn compact_remnants() {
        let base = lookup(30.0);
        let ns = adjust(Phase::NeutronStar, base);
        assert_eq!((ns.radius, ns.temperature, ns.luminosity), (0.00001, 1_000_000.0, 0.0001));
        let bh = adjust(Phase::BlackHole, base);
        assert_eq!((bh.radius, bh.temperature, bh.luminosity), (0.000001, 0.0, 0.0));
        assert_eq!(bh.lifetime_myr, base.lifetime_myr);
    }

    #[test]
    fn pass_through_phases_keep_base() {
        let base = lookup(3.0);
        for phase in [
            Phase::MainSequence,
            Phase::HeliumBurning,
            Phase::AsymptoticGiant,
            Phase::PlanetaryNebula,
            Phase::Supernova,
        ] {
            assert_eq!(adjust(phase, base), base);
        }
    }

    #[test]
    fn effect_flags() {
        assert!(Phase::MainSequence.is_fusing());
        assert!(Phase::HeliumBurning.is_fusing());
        assert!(!Phase::RedGiant.is_fusing());
        assert!(Phase::Supernova.sheds_material());
        assert!(Phase::PlanetaryNebula.sheds_material());
        assert!(!Phase::WhiteDwarf.sheds_material());
        assert_eq!(Phase::BlackHole.to_string(), "Black Hole");
        assert_eq!(Phase::AsymptoticGiant.slug(), "asymptotic-giant");
    }
}
