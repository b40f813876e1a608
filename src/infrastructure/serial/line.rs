use crate::domain::{
    config::DeviceConfig,
    error::{CutermError, CutermResult},
};
use crate::infrastructure::terminal::Termios;
use std::os::unix::io::RawFd;
use tracing::debug;

/// Map a numeric line speed onto the platform's speed code.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn speed_code(baud_rate: u32) -> Option<libc::speed_t> {
    let code = match baud_rate {
        0 => libc::B0,
        50 => libc::B50,
        75 => libc::B75,
        110 => libc::B110,
        134 => libc::B134,
        150 => libc::B150,
        200 => libc::B200,
        300 => libc::B300,
        600 => libc::B600,
        1200 => libc::B1200,
        1800 => libc::B1800,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        460800 => libc::B460800,
        500000 => libc::B500000,
        576000 => libc::B576000,
        921600 => libc::B921600,
        1000000 => libc::B1000000,
        1152000 => libc::B1152000,
        1500000 => libc::B1500000,
        2000000 => libc::B2000000,
        2500000 => libc::B2500000,
        3000000 => libc::B3000000,
        3500000 => libc::B3500000,
        4000000 => libc::B4000000,
        _ => return None,
    };
    Some(code)
}

/// BSD speed codes are the speeds themselves; the driver rejects what it
/// cannot do when the mode is applied.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn speed_code(baud_rate: u32) -> Option<libc::speed_t> {
    Some(baud_rate as libc::speed_t)
}

/// Build the line mode from the device's current mode
pub fn line_mode(current: &Termios, baud_rate: u32) -> CutermResult<Termios> {
    let mut mode = *current;

    mode.c_iflag &= !(libc::ISTRIP | libc::ICRNL);
    mode.c_oflag &= !libc::OPOST;
    mode.c_lflag &= !(libc::ICANON | libc::ISIG | libc::IEXTEN | libc::ECHO);
    mode.c_cflag &= !(libc::CSIZE | libc::PARENB);
    mode.c_cflag |= libc::CREAD | libc::CS8 | libc::CLOCAL;
    mode.c_cc[libc::VMIN] = 1;
    mode.c_cc[libc::VTIME] = 0;

    let speed = speed_code(baud_rate).ok_or_else(|| CutermError::LineConfig {
        operation: "cfsetspeed",
        message: format!("unsupported speed {}", baud_rate),
    })?;
    if unsafe { libc::cfsetispeed(&mut mode, speed) } != 0 {
        return Err(CutermError::line("cfsetispeed"));
    }
    if unsafe { libc::cfsetospeed(&mut mode, speed) } != 0 {
        return Err(CutermError::line("cfsetospeed"));
    }

    Ok(mode)
}

/// Puts an open serial device into the mode the relay expects
pub struct LineModeConfigurator;

impl LineModeConfigurator {
    pub fn configure(fd: RawFd, config: &DeviceConfig) -> CutermResult<()> {
        let mut current = std::mem::MaybeUninit::<Termios>::uninit();
        if unsafe { libc::tcgetattr(fd, current.as_mut_ptr()) } != 0 {
            return Err(CutermError::line("tcgetattr"));
        }
        let current = unsafe { current.assume_init() };

        let mode = line_mode(&current, config.baud_rate)?;
        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &mode) } != 0 {
            return Err(CutermError::line("tcsetattr"));
        }

        debug!("Configured {} at {} baud", config.path, config.baud_rate);
        Ok(())
    }
}
