// Scoped logging macros. Each subsystem logs under its own scope so a
// single env var can dial verbosity per concern.

/// Log under an explicit scope, honoring the scoped level config.
#[macro_export]
macro_rules! scoped_log {
    ($level:ident, $scope:expr, $($arg:tt)*) => {{
        let log_config = $crate::logging::get_log_config();
        if log_config.should_log($scope, $crate::logging::level_from_name(stringify!($level))) {
            ::tracing::$level!(scope = $scope, $($arg)*);
        }
    }};
}

#[macro_export]
macro_rules! teleport_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "teleport", $($arg)*);
    };
}

#[macro_export]
macro_rules! grab_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "grab", $($arg)*);
    };
}

#[macro_export]
macro_rules! physics_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "physics", $($arg)*);
    };
}

#[macro_export]
macro_rules! input_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "input", $($arg)*);
    };
}
