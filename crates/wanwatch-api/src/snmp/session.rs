// SNMP session seam.
//
// The acquisition logic only needs subtree walks and a multi-OID GET.
// Abstracting those two calls lets the correlation code run against an
// in-memory agent in tests while production uses `async_snmp::Client`.

use std::future::Future;

use async_snmp::{Client, Oid, Transport, VarBind};

use crate::error::Error;

pub trait SnmpSession: Send + Sync {
    /// Every binding under `root`, in agent order.
    fn walk(&self, root: &Oid) -> impl Future<Output = Result<Vec<VarBind>, Error>> + Send;

    /// One binding per requested OID, in request order.
    fn get_many(&self, oids: &[Oid]) -> impl Future<Output = Result<Vec<VarBind>, Error>> + Send;
}

impl<T: Transport + 'static> SnmpSession for Client<T> {
    async fn walk(&self, root: &Oid) -> Result<Vec<VarBind>, Error> {
        Ok(Client::walk(self, root.clone())?.collect().await?)
    }

    async fn get_many(&self, oids: &[Oid]) -> Result<Vec<VarBind>, Error> {
        Ok(Client::get_many(self, oids).await?)
    }
}
