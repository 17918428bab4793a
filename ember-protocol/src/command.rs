//! Command registry
//!
//! Every tunable or observable channel value has one named command. The
//! registry is a closed enum so the executor can match exhaustively.

/// Channel commands addressable over the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Enable or disable the heater (`0`/`1`)
    Enable,
    /// Temperature setpoint in °C
    TemperatureSetpoint,
    /// Measured temperature in °C (read only)
    MeasuredTemperature,
    /// Measured thermocouple voltage in µV (read only)
    MeasuredVoltage,
    /// Whether the channel is sleeping (read only)
    SleepState,
    /// Controller output ratio (read only)
    PidOutput,
    /// Runaway cutout temperature in °C
    RunawayThreshold,
    /// Lowest accepted setpoint in °C
    SetpointMin,
    /// Highest accepted setpoint in °C
    SetpointMax,
    /// Setpoint as thermocouple voltage in µV
    VoltageSetpoint,
    /// Proportional gain
    PidKp,
    /// Integral gain
    PidKi,
    /// Derivative gain
    PidKd,
    /// Derivative filter time constant in seconds
    PidDerivativeTau,
    /// Sleep setpoint in °C
    SleepTemperature,
    /// Sleep delay in seconds
    SleepDelay,
    /// Calibration table access
    CalibrationTable,
    /// Restore defaults for a thermocouple sensitivity in µV/K
    RestoreDefaults,
}

impl CommandKind {
    /// All commands, in registry order
    pub const ALL: [CommandKind; 18] = [
        CommandKind::Enable,
        CommandKind::TemperatureSetpoint,
        CommandKind::MeasuredTemperature,
        CommandKind::MeasuredVoltage,
        CommandKind::SleepState,
        CommandKind::PidOutput,
        CommandKind::RunawayThreshold,
        CommandKind::SetpointMin,
        CommandKind::SetpointMax,
        CommandKind::VoltageSetpoint,
        CommandKind::PidKp,
        CommandKind::PidKi,
        CommandKind::PidKd,
        CommandKind::PidDerivativeTau,
        CommandKind::SleepTemperature,
        CommandKind::SleepDelay,
        CommandKind::CalibrationTable,
        CommandKind::RestoreDefaults,
    ];

    /// Wire name of the command
    pub const fn name(self) -> &'static str {
        match self {
            CommandKind::Enable => "en",
            CommandKind::TemperatureSetpoint => "set_t",
            CommandKind::MeasuredTemperature => "meas_t",
            CommandKind::MeasuredVoltage => "meas_uv",
            CommandKind::SleepState => "sleep_state",
            CommandKind::PidOutput => "pid_op",
            CommandKind::RunawayThreshold => "runaway_t",
            CommandKind::SetpointMin => "set_min_t",
            CommandKind::SetpointMax => "set_max_t",
            CommandKind::VoltageSetpoint => "set_uv",
            CommandKind::PidKp => "pid_kp",
            CommandKind::PidKi => "pid_ki",
            CommandKind::PidKd => "pid_kd",
            CommandKind::PidDerivativeTau => "pid_d_tau",
            CommandKind::SleepTemperature => "sleep_set_t",
            CommandKind::SleepDelay => "sleep_delay",
            CommandKind::CalibrationTable => "tc_cal_table",
            CommandKind::RestoreDefaults => "restore",
        }
    }

    /// Look a command up by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Commands that only answer queries
    pub const fn is_read_only(self) -> bool {
        matches!(
            self,
            CommandKind::MeasuredTemperature
                | CommandKind::MeasuredVoltage
                | CommandKind::SleepState
                | CommandKind::PidOutput
        )
    }
}
