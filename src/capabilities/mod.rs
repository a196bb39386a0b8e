mod http;
mod kv;
mod timer;

pub use self::http::{
    Http, HttpError, HttpMethod, HttpOperation, HttpRequest, HttpResponse, HttpResult,
    ValidatedUrl, MAX_RESPONSE_BYTES,
};
pub use self::kv::{KeyValue, KvError, KvOperation, KvOutput, KvResult, MAX_VALUE_BYTES};
pub use self::timer::{Timer, TimerOperation, TimerOutput};

pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

pub type AppHttp = Http<Event>;
pub type AppKv = KeyValue<Event>;
pub type AppTimer = Timer<Event>;
pub type AppRender = Render<Event>;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub key_value: KeyValue<Event>,
    pub timer: Timer<Event>,
    pub render: Render<Event>,
}
