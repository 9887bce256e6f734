use actix_cors::Cors;
use actix_http::Request;
use actix_service::IntoServiceFactory;
use actix_web::body::MessageBody;
use actix_web::dev::{
    AppConfig as ActixAppCfg, Response, ServiceFactory, ServiceRequest, ServiceResponse,
};
use actix_web::web;
use actix_web::{App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;

use crate::api::web::AppRouteTable;
use crate::auth::validate_jwt;
use crate::AppSharedState;

/*
 * `App` cannot easily be moved across functions, the FAQ entry below
 * demonstrates the return-type gymnastics this requires :
 * https://github.com/actix/actix-web/wiki/FAQ#how-can-i-return-app-from-a-function--why-is-appentry-private
 * */
pub fn app_web_service(
    mut route_table: AppRouteTable,
    cfg: Vec<(String, String)>,
    cors_origin: String,
    shr_state: AppSharedState,
) -> (
    App<
        impl ServiceFactory<
            ServiceRequest,
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::error::Error,
            Config = (),
            InitError = (),
        >,
    >,
    usize,
) {
    let keystore = shr_state.auth_keystore();
    let mut num_applied = 0usize;
    let num_applied_p = &mut num_applied;
    let cfg_fn = move |c: &mut web::ServiceConfig| {
        *num_applied_p = cfg
            .into_iter()
            .filter_map(|(path, inner_label)| {
                route_table
                    .entries
                    .remove(inner_label.as_str())
                    .map(|found| (path, found))
            })
            .map(|(path, route_found)| {
                c.route(path.as_str(), route_found);
            })
            .count();
    };
    let cors = if cors_origin.as_str() == "*" {
        Cors::permissive()
    } else {
        Cors::default()
            .allowed_origin(cors_origin.as_str())
            .allowed_methods(["GET", "POST", "PATCH", "PUT", "DELETE"])
            .allow_any_header()
            .max_age(3600)
    };
    let authn = HttpAuthentication::bearer(validate_jwt);
    let path_prefix = format!("/{}", route_table.version.as_str());
    let v_scope = web::scope(path_prefix.as_str())
        .wrap(authn)
        .configure(cfg_fn);
    let app = App::new()
        .app_data(web::Data::new(shr_state))
        .app_data(keystore)
        .wrap(cors)
        .service(v_scope);
    (app, num_applied)
} // end of fn app_web_service

pub fn net_server_listener<F, I, S, B>(
    app_init_cb: F,
    domain_host: &str,
    port: u16,
    num_workers: usize,
) -> HttpServer<F, I, S, B>
where
    F: Fn() -> I + Clone + Send + 'static,
    I: IntoServiceFactory<S, Request>,
    S: ServiceFactory<Request, Config = ActixAppCfg> + 'static,
    S::Error: Into<actix_web::error::Error>,
    S::InitError: std::fmt::Debug,
    S::Response: Into<Response<B>>,
    B: MessageBody + 'static,
{
    let domain = format!("{domain_host}:{port}");
    let result = HttpServer::new(app_init_cb).workers(num_workers.max(1)).bind(domain);
    result.unwrap()
}
