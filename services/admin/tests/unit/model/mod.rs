mod chat_session;
mod discount;
mod order;
mod retention;
