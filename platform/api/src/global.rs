use crate::config::{ApiConfig, HolidayConfig, ScheduleConfig};

pub trait ApiState {
	/// Shared by every holiday lookup.
	fn holiday_client(&self) -> &reqwest::Client;
}

pub trait ApiGlobal:
	binary_helper::global::GlobalCtx
	+ binary_helper::global::GlobalConfigProvider<ApiConfig>
	+ binary_helper::global::GlobalConfigProvider<HolidayConfig>
	+ binary_helper::global::GlobalConfigProvider<ScheduleConfig>
	+ binary_helper::global::GlobalDb
	+ binary_helper::global::GlobalConfig
	+ ApiState
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> ApiGlobal for T where
	T: binary_helper::global::GlobalCtx
		+ binary_helper::global::GlobalConfigProvider<ApiConfig>
		+ binary_helper::global::GlobalConfigProvider<HolidayConfig>
		+ binary_helper::global::GlobalConfigProvider<ScheduleConfig>
		+ binary_helper::global::GlobalDb
		+ binary_helper::global::GlobalConfig
		+ ApiState
		+ Send
		+ Sync
		+ 'static
{
}
