pub mod airplane;
pub mod airplane_type;
pub mod airport;
pub mod crew;
pub mod flight;
pub mod order;
pub mod route;
pub mod ticket;
pub mod user;

pub use airplane::{Airplane, AirplaneDetail, AirplaneFilter, AirplaneListItem, SeatGrid};
pub use airplane_type::AirplaneType;
pub use airport::Airport;
pub use crew::Crew;
pub use flight::{Flight, FlightFilter, FlightListItem, FlightSummary};
pub use order::{Order, OrderWithTickets};
pub use route::{Route, RouteDetail};
pub use ticket::{TakenPlace, Ticket};
pub use user::User;
