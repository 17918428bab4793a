//! Command execution
//!
//! Applies one decoded protocol command to a channel. Queries format the
//! current value; set requests validate, apply and persist the whole channel
//! record. A validation failure leaves the channel untouched. A failed save
//! keeps the applied edit in RAM and reports [`SAVE_FAILED`].
//!
//! [`SAVE_FAILED`]: crate::error::SAVE_FAILED

use ember_protocol::calibration::format_point;
use ember_protocol::format::{count, fixed, flag, text};
use ember_protocol::{
    parse_decimal, parse_flag, Argument, CalibrationError, CalibrationRequest, CommandKind, Reply,
};

use crate::calibration::{CalibrationPoint, TABLE_SIZE};
use crate::channel::Channel;
use crate::config::channel::DEFAULT_SETPOINT_MIN_C;
use crate::config::ChannelConfig;
use crate::error::Error;
use crate::traits::{HeaterOutput, PersistentStore, StandSensor, ThermocoupleInput};

/// Execute a command on a channel
///
/// # Arguments
/// - `channel`: target channel
/// - `kind`: decoded command name
/// - `argument`: `?` or the set value
/// - `store`: storage the channel record is saved to
pub fn execute<T, S, H, P>(
    channel: &mut Channel<'_, T, S, H>,
    kind: CommandKind,
    argument: Argument<'_>,
    store: &mut P,
) -> Result<Reply, Error>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
    P: PersistentStore,
{
    let value = match argument {
        // A restore always needs the thermocouple sensitivity
        Argument::Query if kind == CommandKind::RestoreDefaults => {
            return Err(Error::InvalidInput("invalid thermocouple S[uV/K]"));
        }
        Argument::Query => return Ok(query(channel, kind)),
        Argument::Value(value) => value,
    };

    match kind {
        CommandKind::Enable => {
            let enabled = parse_flag(value).map_err(|_| Error::InvalidInput("invalid value"))?;
            channel.set_enabled(enabled);
            // Enable state is volatile, nothing to save
            return Ok(text("OK"));
        }
        CommandKind::MeasuredTemperature | CommandKind::SleepState => {
            return Err(Error::ReadOnly("command is read only"));
        }
        CommandKind::MeasuredVoltage | CommandKind::PidOutput => {
            return Err(Error::ReadOnly("value is read only"));
        }
        CommandKind::TemperatureSetpoint => set_temperature(channel, value)?,
        CommandKind::SetpointMin => set_minimum(channel, value)?,
        CommandKind::SetpointMax => set_maximum(channel, value)?,
        CommandKind::VoltageSetpoint => set_voltage(channel, value)?,
        CommandKind::RunawayThreshold => set_runaway(channel, value)?,
        CommandKind::PidKp => channel.config.gains.kp = gain(value, "invalid kp")?,
        CommandKind::PidKi => channel.config.gains.ki = gain(value, "invalid Ki")?,
        CommandKind::PidKd => channel.config.gains.kd = gain(value, "invalid kd")?,
        CommandKind::PidDerivativeTau => {
            let tau = number(value, "invalid float value")?;
            if tau < 0.0 {
                return Err(Error::InvalidInput("value < 0.0"));
            }
            channel.config.gains.derivative_tau_s = tau;
        }
        CommandKind::SleepTemperature => set_sleep_temperature(channel, value)?,
        CommandKind::SleepDelay => {
            let delay = number(value, "invalid value")?;
            if delay < 0.0 {
                return Err(Error::InvalidInput("invalid value < 0"));
            }
            channel.config.sleep_delay_s = delay;
        }
        CommandKind::CalibrationTable => match CalibrationRequest::parse(value, TABLE_SIZE)? {
            CalibrationRequest::Get(index) => return point(&channel.config, index),
            CalibrationRequest::Set {
                index,
                voltage,
                temperature,
            } => {
                channel
                    .config
                    .table
                    .set_point(index, CalibrationPoint::new(voltage, temperature));
            }
        },
        CommandKind::RestoreDefaults => restore(channel, value)?,
    }

    channel.save(store)?;
    Ok(text("OK"))
}

fn query<T, S, H>(channel: &Channel<'_, T, S, H>, kind: CommandKind) -> Reply
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
{
    let config = &channel.config;
    match kind {
        CommandKind::Enable => flag(channel.is_enabled()),
        CommandKind::TemperatureSetpoint => fixed(channel.setpoint_c, 2),
        CommandKind::MeasuredTemperature => {
            fixed(channel.measurement.temperature_c.unwrap_or(f32::NAN), 2)
        }
        CommandKind::MeasuredVoltage => fixed(channel.measurement.voltage_uv, 5),
        CommandKind::SleepState => flag(channel.status().sleeping),
        CommandKind::PidOutput => fixed(channel.pid().output(), 4),
        CommandKind::RunawayThreshold => fixed(config.runaway_threshold_c, 1),
        CommandKind::SetpointMin => fixed(config.setpoint_min_c, 0),
        CommandKind::SetpointMax => fixed(config.setpoint_max_c, 0),
        CommandKind::VoltageSetpoint => fixed(config.voltage_setpoint, 5),
        CommandKind::PidKp => fixed(config.gains.kp, 5),
        CommandKind::PidKi => fixed(config.gains.ki, 5),
        CommandKind::PidKd => fixed(config.gains.kd, 5),
        CommandKind::PidDerivativeTau => fixed(config.gains.derivative_tau_s, 5),
        CommandKind::SleepTemperature => {
            let t = config
                .table
                .voltage_to_temperature(config.sleep_voltage_setpoint)
                .unwrap_or(f32::NAN);
            fixed(t, 1)
        }
        CommandKind::SleepDelay => fixed(config.sleep_delay_s, 2),
        CommandKind::CalibrationTable | CommandKind::RestoreDefaults => count(TABLE_SIZE),
    }
}

fn number(value: &str, message: &'static str) -> Result<f32, Error> {
    parse_decimal(value).map_err(|_| Error::InvalidInput(message))
}

fn gain(value: &str, message: &'static str) -> Result<f32, Error> {
    match parse_decimal(value) {
        Ok(gain) if gain >= 0.0 => Ok(gain),
        _ => Err(Error::InvalidInput(message)),
    }
}

fn point(config: &ChannelConfig, index: usize) -> Result<Reply, Error> {
    config
        .table
        .point(index)
        .map(|p| format_point(p.voltage_uv, p.temperature_c))
        .ok_or_else(|| CalibrationError::InvalidIndex.into())
}

/// Thermocouple voltage for a temperature on the current table
fn calibrated_voltage(config: &ChannelConfig, temperature: f32) -> Result<f32, Error> {
    config
        .table
        .temperature_to_voltage(temperature)
        .map_err(|_| Error::InvalidInput("invalid calibration table"))
}

fn set_temperature<T, S, H>(channel: &mut Channel<'_, T, S, H>, value: &str) -> Result<(), Error>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
{
    let t = number(value, "invalid float value")?;
    let config = &channel.config;
    if !(t >= config.setpoint_min_c && t <= config.setpoint_max_c) {
        return Err(Error::InvalidInput("out of bounds"));
    }

    let voltage = calibrated_voltage(config, t)?;
    channel.setpoint_c = t;
    channel.config.voltage_setpoint = voltage;
    Ok(())
}

fn set_minimum<T, S, H>(channel: &mut Channel<'_, T, S, H>, value: &str) -> Result<(), Error>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
{
    let t = number(value, "invalid float value")?;
    if t > channel.config.setpoint_max_c {
        return Err(Error::InvalidInput("max < min"));
    }
    if t < 0.0 {
        return Err(Error::InvalidInput("value < 0.0"));
    }

    channel.config.setpoint_min_c = t;
    Ok(())
}

fn set_maximum<T, S, H>(channel: &mut Channel<'_, T, S, H>, value: &str) -> Result<(), Error>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
{
    let t = number(value, "invalid float value")?;
    if t < channel.config.setpoint_min_c {
        return Err(Error::InvalidInput("min > max"));
    }
    let limit = channel.sensor_chain().max_microvolts();
    if calibrated_voltage(&channel.config, t)? > limit {
        return Err(Error::HardwareLimitExceeded(
            "temperature exceeds hardware capability",
        ));
    }

    channel.config.setpoint_max_c = t;
    Ok(())
}

fn set_voltage<T, S, H>(channel: &mut Channel<'_, T, S, H>, value: &str) -> Result<(), Error>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
{
    let voltage = number(value, "invalid float value")?;
    if voltage < 0.0 {
        return Err(Error::InvalidInput("voltage < 0.0"));
    }
    if voltage > channel.sensor_chain().max_microvolts() {
        return Err(Error::HardwareLimitExceeded(
            "voltage > max hardware tcv setpoint",
        ));
    }

    channel.config.voltage_setpoint = voltage;
    if let Ok(t) = channel.config.table.voltage_to_temperature(voltage) {
        channel.setpoint_c = t;
    }
    Ok(())
}

fn set_runaway<T, S, H>(channel: &mut Channel<'_, T, S, H>, value: &str) -> Result<(), Error>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
{
    let t = number(value, "invalid value")?;
    if t < 0.0 {
        return Err(Error::InvalidInput("value < 0.0"));
    }
    let limit = channel.sensor_chain().max_microvolts();
    if calibrated_voltage(&channel.config, t)? > limit {
        return Err(Error::HardwareLimitExceeded("value > max hardware limit"));
    }

    channel.config.runaway_threshold_c = t;
    Ok(())
}

fn set_sleep_temperature<T, S, H>(
    channel: &mut Channel<'_, T, S, H>,
    value: &str,
) -> Result<(), Error>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
{
    let t = number(value, "invalid value")?;
    let voltage = calibrated_voltage(&channel.config, t)?;
    if voltage < 0.0 {
        return Err(Error::HardwareLimitExceeded("value < min hardware limit"));
    }
    if voltage > channel.sensor_chain().max_microvolts() {
        return Err(Error::HardwareLimitExceeded("value > max hardware limit"));
    }

    channel.config.sleep_voltage_setpoint = voltage;
    Ok(())
}

fn restore<T, S, H>(channel: &mut Channel<'_, T, S, H>, value: &str) -> Result<(), Error>
where
    T: ThermocoupleInput,
    S: StandSensor,
    H: HeaterOutput,
{
    let sensitivity = number(value, "invalid thermocouple S[uV/K]")?;
    let config = ChannelConfig::restored(sensitivity)
        .ok_or(Error::InvalidInput("S[uV/K] outside of range"))?;

    channel.config = config;
    channel.setpoint_c = DEFAULT_SETPOINT_MIN_C;
    channel.reset_runtime();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::tests::{Rig, TestChannel};
    use crate::persistence::tests::MockStore;
    use crate::traits::StoreError;

    fn run(
        channel: &mut TestChannel<'_>,
        store: &mut MockStore,
        kind: CommandKind,
        value: &str,
    ) -> Result<Reply, Error> {
        let argument = if value == "?" {
            Argument::Query
        } else {
            Argument::Value(value)
        };
        execute(channel, kind, argument, store)
    }

    fn ok(result: Result<Reply, Error>) -> Reply {
        match result {
            Ok(reply) => reply,
            Err(e) => panic!("unexpected error: {}", e.message()),
        }
    }

    fn message(result: Result<Reply, Error>) -> &'static str {
        match result {
            Ok(reply) => panic!("unexpected reply: {}", reply),
            Err(e) => e.message(),
        }
    }

    /// Channel on a gain-400 chain, restored with 40 µV/K
    fn restored_channel<'r>(rig: &'r Rig, store: &mut MockStore) -> TestChannel<'r> {
        let mut channel = rig.channel(0, 400.0);
        ok(run(&mut channel, store, CommandKind::RestoreDefaults, "40"));
        channel
    }

    #[test]
    fn test_restore_then_set_temperature() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::TemperatureSetpoint, "?")), "100.00");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::TemperatureSetpoint, "300")), "OK");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::TemperatureSetpoint, "?")), "300.00");
        assert_eq!(
            ok(run(&mut channel, &mut store, CommandKind::VoltageSetpoint, "?")),
            "12000.00000"
        );
    }

    #[test]
    fn test_setpoint_bounds() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::TemperatureSetpoint, "99.9")),
            "out of bounds"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::TemperatureSetpoint, "400.1")),
            "out of bounds"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::TemperatureSetpoint, "abc")),
            "invalid float value"
        );
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::TemperatureSetpoint, "?")), "100.00");
    }

    #[test]
    fn test_limits_keep_order() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::SetpointMin, "401")),
            "max < min"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::SetpointMin, "-1")),
            "value < 0.0"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::SetpointMax, "50")),
            "min > max"
        );
        // 8250 µV span at 40 µV/K tops out near 206 °C
        assert_eq!(
            run(&mut channel, &mut store, CommandKind::SetpointMax, "210"),
            Err(Error::HardwareLimitExceeded("temperature exceeds hardware capability"))
        );
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SetpointMax, "200")), "OK");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SetpointMax, "?")), "200");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SetpointMin, "?")), "100");
    }

    #[test]
    fn test_voltage_setpoint_updates_display() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::VoltageSetpoint, "6000")), "OK");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::TemperatureSetpoint, "?")), "150.00");
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::VoltageSetpoint, "-1")),
            "voltage < 0.0"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::VoltageSetpoint, "8251")),
            "voltage > max hardware tcv setpoint"
        );
    }

    #[test]
    fn test_read_only_commands() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        for (kind, expected) in [
            (CommandKind::MeasuredTemperature, "command is read only"),
            (CommandKind::SleepState, "command is read only"),
            (CommandKind::MeasuredVoltage, "value is read only"),
            (CommandKind::PidOutput, "value is read only"),
        ] {
            assert_eq!(run(&mut channel, &mut store, kind, "1"), Err(Error::ReadOnly(expected)));
        }

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SleepState, "?")), "0");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::PidOutput, "?")), "0.0000");
        assert_eq!(
            ok(run(&mut channel, &mut store, CommandKind::MeasuredVoltage, "?")),
            "0.00000"
        );
    }

    #[test]
    fn test_measured_values_after_sample() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);
        rig.raw.set(Ok(2048));
        channel.sample(0);

        let voltage: f32 = ok(run(&mut channel, &mut store, CommandKind::MeasuredVoltage, "?"))
            .parse()
            .unwrap();
        assert!((voltage - 4125.0).abs() < 0.01);
        let temperature: f32 =
            ok(run(&mut channel, &mut store, CommandKind::MeasuredTemperature, "?"))
                .parse()
                .unwrap();
        assert!((temperature - 103.125).abs() < 0.01);
    }

    #[test]
    fn test_enable_is_not_persisted() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = rig.channel(0, 400.0);

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::Enable, "1")), "OK");
        assert!(channel.is_enabled());
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::Enable, "?")), "1");
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::Enable, "2")),
            "invalid value"
        );
        assert!(store.bytes.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_gains() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::PidKp, "2.5")), "OK");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::PidKp, "?")), "2.50000");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::PidDerivativeTau, "?")), "0.25000");
        assert_eq!(message(run(&mut channel, &mut store, CommandKind::PidKp, "-1")), "invalid kp");
        assert_eq!(message(run(&mut channel, &mut store, CommandKind::PidKi, "x")), "invalid Ki");
        assert_eq!(message(run(&mut channel, &mut store, CommandKind::PidKd, "-0.1")), "invalid kd");
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::PidDerivativeTau, "-0.1")),
            "value < 0.0"
        );
        assert_eq!(channel.config().gains.kp, 2.5);
    }

    #[test]
    fn test_sleep_settings() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SleepTemperature, "?")), "150.0");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SleepTemperature, "120")), "OK");
        assert!((channel.config().sleep_voltage_setpoint - 4800.0).abs() < 1e-2);
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::SleepTemperature, "-10")),
            "value < min hardware limit"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::SleepTemperature, "300")),
            "value > max hardware limit"
        );

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SleepDelay, "?")), "30.00");
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::SleepDelay, "-1")),
            "invalid value < 0"
        );
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SleepDelay, "12.5")), "OK");
        assert_eq!(channel.config().sleep_delay_us(), 12_500_000);
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::SleepDelay, "5000")), "OK");
        assert_eq!(channel.config().sleep_delay_us(), 5_000_000_000);
    }

    #[test]
    fn test_runaway_threshold() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::RunawayThreshold, "?")), "480.0");
        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::RunawayThreshold, "190")), "OK");
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::RunawayThreshold, "-5")),
            "value < 0.0"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::RunawayThreshold, "250")),
            "value > max hardware limit"
        );
    }

    #[test]
    fn test_calibration_table() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);

        assert_eq!(ok(run(&mut channel, &mut store, CommandKind::CalibrationTable, "?")), "10");
        assert_eq!(
            ok(run(&mut channel, &mut store, CommandKind::CalibrationTable, "1")),
            "[2000.00,50.00]"
        );
        assert_eq!(
            ok(run(&mut channel, &mut store, CommandKind::CalibrationTable, "3[100,25]")),
            "OK"
        );
        assert_eq!(
            ok(run(&mut channel, &mut store, CommandKind::CalibrationTable, "3")),
            "[100.00,25.00]"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::CalibrationTable, "10")),
            "Invalid index"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::CalibrationTable, "3[1,2")),
            "Format must be index[x,y]"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::CalibrationTable, "3[a,2]")),
            "Invalid float value"
        );
    }

    #[test]
    fn test_point_past_table_is_an_error() {
        let config = ChannelConfig::restored(40.0).unwrap();
        assert!(point(&config, TABLE_SIZE - 1).is_ok());
        assert_eq!(message(point(&config, TABLE_SIZE)), "Invalid index");
    }

    #[test]
    fn test_restore_needs_value() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = rig.channel(0, 400.0);
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::RestoreDefaults, "?")),
            "invalid thermocouple S[uV/K]"
        );
    }

    #[test]
    fn test_restore_range() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = rig.channel(0, 400.0);

        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::RestoreDefaults, "x")),
            "invalid thermocouple S[uV/K]"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::RestoreDefaults, "0")),
            "S[uV/K] outside of range"
        );
        assert_eq!(
            message(run(&mut channel, &mut store, CommandKind::RestoreDefaults, "41")),
            "S[uV/K] outside of range"
        );
        assert_eq!(channel.config(), &ChannelConfig::zeroed());
    }

    #[test]
    fn test_setter_persists_record() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);
        ok(run(&mut channel, &mut store, CommandKind::PidKi, "0.75"));

        let mut reloaded = rig.channel(0, 400.0);
        reloaded.init(&mut store).unwrap();
        assert_eq!(reloaded.config(), channel.config());
    }

    #[test]
    fn test_save_failure_keeps_edit() {
        let rig = Rig::new();
        let mut store = MockStore::new();
        let mut channel = restored_channel(&rig, &mut store);
        store.fail_writes_from = Some(0);

        let result = run(&mut channel, &mut store, CommandKind::CalibrationTable, "3[100,25]");
        assert_eq!(result, Err(Error::Persistence(StoreError::Timeout)));
        assert_eq!(message(result), "FAIL TO SAVE");
        assert_eq!(
            ok(run(&mut channel, &mut store, CommandKind::CalibrationTable, "3")),
            "[100.00,25.00]"
        );
    }
}
