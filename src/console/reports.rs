//! Multi-line messages built from engine, probe and device values

use chrono::{DateTime, Local, Utc};

use crate::host::DeviceInfo;
use crate::terminal::progress::{format_bit_rate, format_bytes};
use crate::transfer::SpeedReport;

/// The submitted line as it appears in the log, under the prompt
pub fn prompt_echo(raw_input: &str) -> String {
    format!("┌──(sensei㉿waster)-[~]\n└─$ {raw_input}")
}

/// Summary printed once when a job reaches its target
pub fn completion_summary(total_bytes: u64, elapsed_secs: f64, average_speed: f64) -> String {
    format!(
        r" _________________________________________
|                                         |
|      [ TASK COMPLETED SUCCESSFULLY ]    |
|_________________________________________|

       \|/
      (o o)
  +----( )----+
  |   DONE!   |
  +-----------+

  [✔] STATUS  : VERIFIED
  [✔] TOTAL   : {}
  [✔] TIME    : {:.1}s
  [✔] AVG SPD : {}
_________________________________________",
        format_bytes(total_bytes),
        elapsed_secs,
        format_bit_rate(average_speed)
    )
}

/// Final speed test report
pub fn speed_report(report: &SpeedReport) -> String {
    format!(
        r"  ____  ____  ____  ____  ____
 ||S ||||P ||||E ||||E ||||D ||
 ||__||||__||||__||||__||||__||
 |/__\||/__\||/__\||/__\||/__\|

 =================================
  ➤ PING      : {} ms
  ➤ SPEED     : {}
  ➤ DATA USED : {}
 =================================",
        report.ping.as_millis(),
        format_bit_rate(report.speed_bytes_per_sec()),
        format_bytes(report.bytes)
    )
}

/// Diagnostics block printed by `sys`
pub fn system_diagnostics(info: &DeviceInfo) -> String {
    let power = if info.is_charging == "YES" {
        "CHARGING"
    } else {
        "DISCHARGING"
    };
    format!(
        "[ SYSTEM DIAGNOSTICS ]
----------------------
OS      : {}
IP      : {}
ISP     : {}
NET     : {} ({})
BATTERY : {} ({})
CORES   : {}
RES     : {}
LOC     : {}, {}",
        info.os,
        info.ip,
        info.isp,
        info.connection_type,
        info.downlink,
        info.battery_level,
        power,
        info.cores,
        info.screen,
        info.city,
        info.country
    )
}

/// Local and UTC clocks for the same instant
pub fn clock_report(now: DateTime<Local>) -> String {
    format!(
        "LOCAL: {}\nUTC  : {}",
        now.format("%Y-%m-%d %H:%M:%S %Z"),
        now.with_timezone(&Utc).format("%a, %d %b %Y %H:%M:%S GMT")
    )
}
