//! Motor groups

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Deserialize;

// Internal
use super::{
    check_port, ConfigError, Gearset, Motor, MotorBackend, Telemetry,
    MAX_VOLTAGE_MV
};
use util::maths::{lin_map, mean, sym_clamp};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Port configuration of a motor group as found in parameter files.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GroupParams {
    /// Smart ports of each motor in the group.
    pub ports: Vec<u8>,

    /// Reversal flag for each entry in `ports`.
    pub reversed: Vec<bool>,

    /// Gear cartridge fitted to every motor in the group.
    #[serde(default)]
    pub gearset: Gearset
}

/// One or more physically ganged motors commanded identically.
pub struct MotorGroup {
    members: Vec<Member>,
    gearset: Gearset,

    /// Position target recorded by the controller driving this group.
    target_pos_deg: f64
}

struct Member {
    motor: Box<dyn Motor>,
    reversed: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Member {
    /// Sign to apply to commands and readings for this motor.
    fn sign(&self) -> f64 {
        if self.reversed { -1.0 } else { 1.0 }
    }
}

impl MotorGroup {
    /// Build a group from the given ports and reversal flags.
    ///
    /// Fails if there are no ports, if the number of flags doesn't match the
    /// number of ports, or if any port is invalid or already taken.
    pub fn new(
        ports: &[u8],
        reversed: &[bool],
        gearset: Gearset,
        backend: &mut dyn MotorBackend
    ) -> Result<Self, ConfigError> {
        if ports.is_empty() {
            return Err(ConfigError::EmptyGroup);
        }

        if ports.len() != reversed.len() {
            return Err(ConfigError::ReversalMismatch {
                num_ports: ports.len(),
                num_flags: reversed.len()
            });
        }

        for (i, &port) in ports.iter().enumerate() {
            check_port(port)?;

            if ports[..i].contains(&port) {
                return Err(ConfigError::PortInUse(port));
            }
        }

        let mut members = Vec::with_capacity(ports.len());
        for (&port, &rev) in ports.iter().zip(reversed) {
            match backend.open(port, gearset) {
                Ok(motor) => members.push(Member {
                    motor,
                    reversed: rev
                }),
                Err(e) => {
                    // Hand back the ports opened so far, nothing owns them
                    for m in members.drain(..) {
                        backend.release(m.motor.port());
                    }
                    return Err(e);
                }
            }
        }

        debug!(
            "Motor group on ports {:?} (reversed {:?}, {:?} gearset) created",
            ports, reversed, gearset
        );

        Ok(Self {
            members,
            gearset,
            target_pos_deg: 0.0
        })
    }

    /// Build a group from its parameters.
    pub fn from_params(
        params: &GroupParams,
        backend: &mut dyn MotorBackend
    ) -> Result<Self, ConfigError> {
        Self::new(&params.ports, &params.reversed, params.gearset, backend)
    }

    /// Fastest velocity the group can be commanded to.
    ///
    /// Units: rpm
    pub fn max_velocity_rpm(&self) -> f64 {
        self.gearset.max_rpm()
    }

    /// Command every motor to the same velocity, limited to the gearset's
    /// free speed.
    ///
    /// Positive is the group's forward direction.
    pub fn set_velocity(&mut self, velocity_rpm: f64) {
        let velocity_rpm = sym_clamp(velocity_rpm, self.max_velocity_rpm());

        for m in self.members.iter_mut() {
            let sign = m.sign();
            m.motor.set_velocity(sign * velocity_rpm);
        }
    }

    /// Command every motor to the same voltage, limited to +/-12 V.
    ///
    /// Units: millivolts
    pub fn set_voltage(&mut self, voltage_mv: f64) {
        let voltage_mv = sym_clamp(voltage_mv, MAX_VOLTAGE_MV);

        for m in self.members.iter_mut() {
            let sign = m.sign();
            m.motor.set_voltage(sign * voltage_mv);
        }
    }

    /// Command the group from a normalised joystick value.
    ///
    /// Values outside [-1, 1] are clamped, the result is mapped linearly onto
    /// the gearset's velocity range.
    pub fn set_digital_mapped(&mut self, value: f64) {
        let max = self.max_velocity_rpm();
        let value = sym_clamp(value, 1.0);

        self.set_velocity(lin_map((-1.0, 1.0), (-max, max), value));
    }

    /// Record the position the group is being driven toward.
    ///
    /// This only affects telemetry, the motors are not commanded.
    pub fn set_target_position(&mut self, target_deg: f64) {
        self.target_pos_deg = target_deg;
    }

    /// Zero the position reference of every motor in the group.
    pub fn tare_position(&mut self) {
        for m in self.members.iter_mut() {
            m.motor.tare_position();
        }
    }

    /// Mean position of the group.
    ///
    /// Units: degrees
    pub fn position_deg(&self) -> f64 {
        self.signed_mean(|m| m.position_deg())
    }

    /// Units: degrees
    pub fn target_position_deg(&self) -> f64 {
        self.target_pos_deg
    }

    /// Mean velocity of the group.
    ///
    /// Units: rpm
    pub fn velocity_rpm(&self) -> f64 {
        self.signed_mean(|m| m.velocity_rpm())
    }

    /// Units: rpm
    pub fn target_velocity_rpm(&self) -> f64 {
        self.signed_mean(|m| m.target_velocity_rpm())
    }

    /// Temperature of the hottest motor.
    ///
    /// Units: degrees celsius
    pub fn temperature_c(&self) -> f64 {
        self.members
            .iter()
            .map(|m| m.motor.temperature_c())
            .fold(std::f64::NEG_INFINITY, f64::max)
    }

    /// Mean torque of the group.
    ///
    /// Units: newton meters
    pub fn torque_nm(&self) -> f64 {
        let torques: Vec<f64> = self.members
            .iter()
            .map(|m| m.motor.torque_nm())
            .collect();

        mean(&torques).unwrap_or(0.0)
    }

    /// Read a fresh telemetry snapshot from the motors.
    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            pos_deg: self.position_deg(),
            target_pos_deg: self.target_position_deg(),
            velo_rpm: self.velocity_rpm(),
            target_velo_rpm: self.target_velocity_rpm(),
            temp_c: self.temperature_c(),
            torque_nm: self.torque_nm()
        }
    }

    /// Mean of a directional reading with each motor's reversal applied.
    fn signed_mean<F>(&self, read: F) -> f64
    where
        F: Fn(&dyn Motor) -> f64
    {
        let values: Vec<f64> = self.members
            .iter()
            .map(|m| m.sign() * read(m.motor.as_ref()))
            .collect();

        mean(&values).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::{SimBackend, SimParams};

    fn backend() -> SimBackend {
        SimBackend::new(SimParams {
            step_s: 0.02,
            time_const_s: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_config_errors() {
        let mut b = backend();

        assert_eq!(
            MotorGroup::new(&[], &[], Gearset::Green, &mut b).err(),
            Some(ConfigError::EmptyGroup)
        );
        assert_eq!(
            MotorGroup::new(&[1, 2], &[false], Gearset::Green, &mut b).err(),
            Some(ConfigError::ReversalMismatch { num_ports: 2, num_flags: 1 })
        );
        assert_eq!(
            MotorGroup::new(&[22], &[false], Gearset::Green, &mut b).err(),
            Some(ConfigError::PortOutOfRange(22))
        );
        assert_eq!(
            MotorGroup::new(&[0], &[false], Gearset::Green, &mut b).err(),
            Some(ConfigError::PortOutOfRange(0))
        );

        assert!(MotorGroup::new(&[1, 2], &[false, true], Gearset::Green, &mut b).is_ok());
        assert_eq!(
            MotorGroup::new(&[3, 2], &[false, false], Gearset::Green, &mut b).err(),
            Some(ConfigError::PortInUse(2))
        );

        // A port listed twice in one group
        assert_eq!(
            MotorGroup::new(&[4, 4], &[false, false], Gearset::Green, &mut b).err(),
            Some(ConfigError::PortInUse(4))
        );

        // None of the failed groups kept a port
        assert_eq!(b.ports(), vec![1, 2]);
    }

    #[test]
    fn test_failed_group_frees_ports() {
        let mut b = backend();
        let _first = MotorGroup::new(&[1, 2], &[false, true], Gearset::Green, &mut b)
            .unwrap();

        // Port 3 opens before port 2 is found taken
        assert_eq!(
            MotorGroup::new(&[3, 2], &[false, false], Gearset::Green, &mut b).err(),
            Some(ConfigError::PortInUse(2))
        );
        assert!(b.handle(3).is_none());

        let mut group = MotorGroup::new(&[3], &[false], Gearset::Green, &mut b)
            .unwrap();
        group.set_velocity(50.0);
        assert_eq!(b.handle(3).unwrap().commanded_velocity_rpm(), 50.0);
    }

    #[test]
    fn test_reversal_applied() {
        let mut b = backend();
        let mut group = MotorGroup::new(
            &[1, 2], &[false, true], Gearset::Green, &mut b
        ).unwrap();

        group.set_velocity(100.0);

        // Raw motors spin in opposite directions
        assert_eq!(b.handle(1).unwrap().commanded_velocity_rpm(), 100.0);
        assert_eq!(b.handle(2).unwrap().commanded_velocity_rpm(), -100.0);

        // But the group reads as moving forward
        assert!(group.position_deg() > 0.0);
        assert_eq!(group.velocity_rpm(), 100.0);
        assert_eq!(group.target_velocity_rpm(), 100.0);
    }

    #[test]
    fn test_command_limits() {
        let mut b = backend();
        let mut group = MotorGroup::new(&[1], &[false], Gearset::Red, &mut b)
            .unwrap();
        let h = b.handle(1).unwrap();

        group.set_velocity(1000.0);
        assert_eq!(h.commanded_velocity_rpm(), 100.0);

        group.set_voltage(-20000.0);
        assert_eq!(h.commanded_voltage_mv(), Some(-MAX_VOLTAGE_MV));
    }

    #[test]
    fn test_digital_mapped() {
        let mut b = backend();
        let mut group = MotorGroup::new(&[5], &[true], Gearset::Blue, &mut b)
            .unwrap();
        let h = b.handle(5).unwrap();

        group.set_digital_mapped(0.5);
        assert_eq!(h.commanded_velocity_rpm(), -300.0);

        group.set_digital_mapped(-3.0);
        assert_eq!(h.commanded_velocity_rpm(), 600.0);
    }

    #[test]
    fn test_tare_and_telemetry() {
        let mut b = backend();
        let mut group = MotorGroup::new(
            &[1, 2], &[false, false], Gearset::Green, &mut b
        ).unwrap();

        group.set_voltage(6000.0);
        assert!(group.position_deg() > 0.0);

        group.tare_position();
        assert_eq!(group.position_deg(), 0.0);

        group.set_target_position(90.0);
        b.handle(2).unwrap().set_temperature_c(55.0);

        let tm = group.telemetry();
        assert_eq!(tm.pos_deg, 0.0);
        assert_eq!(tm.target_pos_deg, 90.0);
        assert_eq!(tm.temp_c, 55.0);
        assert_eq!(tm.target_velo_rpm, 0.0);
    }
}
